//! Raw API objects → plain records. Total: never fails, substitutes sentinels and defaults.

use crate::date::epoch_to_rfc3339;
use crate::model::{RawComment, RawPost};
use crate::records::{Comment, Post, DELETED_AUTHOR, REMOVED_BODY};

const REDDIT_ORIGIN: &str = "https://reddit.com";

pub fn normalize_post(raw: &RawPost) -> Post {
    let id = if !raw.name.is_empty() {
        raw.name.clone()
    } else if raw.id.is_empty() {
        String::new()
    } else {
        format!("t3_{}", raw.id)
    };

    Post {
        id,
        title: raw.title.clone(),
        author: normalize_author(raw.author.as_deref()),
        text: normalize_body(Some(&raw.selftext), raw.removed_by_category.as_deref()),
        score: raw.score,
        upvote_ratio: raw.upvote_ratio,
        num_comments: raw.num_comments,
        created_utc: epoch_to_rfc3339(raw.created_utc),
        url: raw.url.clone(),
        permalink: absolute_permalink(&raw.permalink),
        subreddit: raw.subreddit.clone(),
    }
}

pub fn normalize_comment(raw: &RawComment) -> Comment {
    Comment {
        id: raw.fullname(),
        author: normalize_author(raw.author.as_deref()),
        body: normalize_body(raw.body.as_deref(), raw.removed_by_category.as_deref()),
        score: raw.score,
        created_utc: epoch_to_rfc3339(raw.created_utc),
        permalink: absolute_permalink(&raw.permalink),
        is_submitter: raw.is_submitter,
        parent_id: raw.parent_id.clone(),
    }
}

/// Missing, blank and pseudo-user authors all become `[deleted]`.
pub fn normalize_author(author: Option<&str>) -> String {
    match author.map(str::trim) {
        None | Some("") | Some("[deleted]") | Some("[removed]") => DELETED_AUTHOR.to_string(),
        Some(a) => a.to_string(),
    }
}

/// Removed or deleted bodies become `[removed]`; a missing body is an empty string.
pub fn normalize_body(body: Option<&str>, removed_by_category: Option<&str>) -> String {
    if removed_by_category.is_some_and(|c| !c.is_empty()) {
        return REMOVED_BODY.to_string();
    }
    match body {
        Some(b) if matches!(b.trim(), "[removed]" | "[deleted]") => REMOVED_BODY.to_string(),
        Some(b) => b.to_string(),
        None => String::new(),
    }
}

/// Reddit returns site-relative permalinks (`/r/x/comments/...`).
pub fn absolute_permalink(permalink: &str) -> String {
    if permalink.is_empty() || permalink.starts_with("http://") || permalink.starts_with("https://") {
        permalink.to_string()
    } else if permalink.starts_with('/') {
        format!("{REDDIT_ORIGIN}{permalink}")
    } else {
        format!("{REDDIT_ORIGIN}/{permalink}")
    }
}
