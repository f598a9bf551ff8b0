//! Normalized, export-ready records. These are plain values: no lazy state, no API handles.

use serde::{Deserialize, Serialize};

/// Placeholder for authors whose account was deleted or is missing.
pub const DELETED_AUTHOR: &str = "[deleted]";
/// Placeholder for bodies that were removed by moderators or deleted by their author.
pub const REMOVED_BODY: &str = "[removed]";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Fullname, `t3_<id>`.
    pub id: String,
    pub title: String,
    pub author: String,
    pub text: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: i64,
    pub created_utc: String,
    pub url: String,
    pub permalink: String,
    pub subreddit: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Fullname, `t1_<id>`.
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: String,
    pub permalink: String,
    pub is_submitter: bool,
    /// Fullname of the parent comment, or of the post for top-level comments.
    pub parent_id: String,
}

/// One fetched thread: the post, its comments in pre-order, and when it was scraped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThreadResult {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub scraped_at: String,
}

impl ThreadResult {
    /// Check that every comment's parent is the post or an earlier comment.
    /// Returns the id of the first comment that violates it.
    pub fn first_orphan(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::with_capacity(self.comments.len() + 1);
        seen.insert(self.post.id.as_str());
        for c in &self.comments {
            if !seen.contains(c.parent_id.as_str()) {
                return Some(c.id.as_str());
            }
            seen.insert(c.id.as_str());
        }
        None
    }
}

/// A successful result tagged with its 1-based position in the input batch.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrapedThread {
    pub index: usize,
    pub url: String,
    pub result: ThreadResult,
}
