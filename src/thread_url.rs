//! Thread URL validation: accept submission links only, extract the submission id.

use crate::error::{Result, ScrapeError};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A validated reference to a Reddit submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadRef {
    /// Base-36 submission id, lowercase, without the `t3_` prefix.
    pub id: String,
    /// Subreddit from the URL when present (short links carry none).
    pub subreddit: Option<String>,
}

impl ThreadRef {
    /// Parse a submission URL. Comment permalinks and non-Reddit links are rejected.
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ScrapeError::invalid_url(url, "empty URL"));
        }

        if let Some(caps) = short_link_re().captures(trimmed) {
            return Ok(Self { id: caps["id"].to_lowercase(), subreddit: None });
        }

        let caps = submission_re()
            .captures(trimmed)
            .ok_or_else(|| ScrapeError::invalid_url(url, "not a Reddit submission link"))?;

        if let Some(rest) = caps.name("rest") {
            let extra: Vec<&str> = rest.as_str().split('/').filter(|s| !s.is_empty()).collect();
            if let Some(first) = extra.first() {
                // `/comments/<id>/<slug>/<comment_id>/` points at a single comment.
                let reason = if is_base36_id(first) {
                    "comment permalink, not a submission"
                } else {
                    "unexpected path after submission slug"
                };
                return Err(ScrapeError::invalid_url(url, reason));
            }
        }

        Ok(Self {
            id: caps["id"].to_lowercase(),
            subreddit: caps.name("sub").map(|m| m.as_str().to_string()),
        })
    }

    /// Fullname of the submission (`t3_<id>`), the parent id of top-level comments.
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.id)
    }
}

impl fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subreddit {
            Some(sub) => write!(f, "r/{sub}/comments/{}", self.id),
            None => write!(f, "comments/{}", self.id),
        }
    }
}

fn is_base36_id(segment: &str) -> bool {
    (1..=12).contains(&segment.len()) && segment.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn submission_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?ix)^https?://(?:(?:www|old|new|np|m)\.)?reddit\.com
              (?:/r/(?P<sub>[a-z0-9_]{2,21}))?
              /comments/(?P<id>[a-z0-9]{1,12})
              (?:/[^/?\#]*(?P<rest>(?:/[^?\#]*)?))?
              /?(?:[?\#].*)?$",
        )
        .expect("static regex")
    })
}

fn short_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^https?://(?:www\.)?redd\.it/(?P<id>[a-z0-9]{1,12})/?(?:[?#].*)?$").expect("static regex")
    })
}
