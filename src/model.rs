//! Raw Reddit API objects, as returned by `/comments/<id>` and `/api/morechildren`.
//! Extra fields are ignored by serde; numeric fields are parsed leniently.

use crate::error::{Result, ScrapeError};
use crate::json_utils::{bool_or_false, f64_or_zero, i64_or_zero, optional_string, string_or_empty};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `{"kind": "Listing", "data": {"children": [...]}}`
#[derive(Debug, Default, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<RawThing>,
    #[serde(default)]
    pub after: Option<String>,
}

/// A `{kind, data}` pair; `data` is decoded once the kind is known.
#[derive(Debug, Deserialize)]
pub struct RawThing {
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPost {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "optional_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub selftext: String,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub score: i64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub upvote_ratio: f64,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub num_comments: i64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub created_utc: f64,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub permalink: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub subreddit: String,
    #[serde(default, deserialize_with = "optional_string")]
    pub removed_by_category: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawComment {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "optional_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub score: i64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub created_utc: f64,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub permalink: String,
    #[serde(default, deserialize_with = "bool_or_false")]
    pub is_submitter: bool,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub parent_id: String,
    #[serde(default, deserialize_with = "optional_string")]
    pub removed_by_category: Option<String>,
    /// Reddit sends `""` for "no replies" and a listing otherwise.
    #[serde(default, deserialize_with = "replies")]
    pub replies: Vec<CommentNode>,
}

impl RawComment {
    /// `t1_<id>`; falls back to building it from `id` when `name` is absent.
    pub fn fullname(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else {
            format!("t1_{}", self.id)
        }
    }
}

/// Placeholder for comments that were not included in the response.
/// `children` empty with `id == "_"` is a "continue this thread" link.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MoreComments {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub parent_id: String,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub count: i64,
    #[serde(default)]
    pub children: Vec<String>,
}

impl MoreComments {
    pub fn is_continue_thread(&self) -> bool {
        self.children.is_empty() && self.id == "_"
    }

    /// Identity of the placeholder for de-duplication.
    pub fn key(&self) -> String {
        if self.is_continue_thread() {
            format!("more:{}:_", self.parent_id)
        } else {
            format!("more:{}:{}", self.parent_id, self.children.join(","))
        }
    }
}

/// One node of the (possibly partially loaded) comment tree.
#[derive(Clone, Debug)]
pub enum CommentNode {
    Comment(RawComment),
    More(MoreComments),
}

impl CommentNode {
    pub fn parent_id(&self) -> &str {
        match self {
            CommentNode::Comment(c) => &c.parent_id,
            CommentNode::More(m) => &m.parent_id,
        }
    }
}

impl RawThing {
    /// Decode a `t1` or `more` thing into a tree node. Other kinds yield `None`.
    pub fn into_node(self) -> Result<Option<CommentNode>> {
        match self.kind.as_str() {
            "t1" => serde_json::from_value(self.data)
                .map(|c| Some(CommentNode::Comment(c)))
                .map_err(|e| ScrapeError::Network(format!("malformed comment: {e}"))),
            "more" => serde_json::from_value(self.data)
                .map(|m| Some(CommentNode::More(m)))
                .map_err(|e| ScrapeError::Network(format!("malformed placeholder: {e}"))),
            _ => Ok(None),
        }
    }
}

/// Decode a listing's children into tree nodes, dropping kinds that are not comments.
pub fn nodes_from_things(things: Vec<RawThing>) -> Result<Vec<CommentNode>> {
    let mut out = Vec::with_capacity(things.len());
    for t in things {
        if let Some(node) = t.into_node()? {
            out.push(node);
        }
    }
    Ok(out)
}

fn replies<'de, D>(deserializer: D) -> std::result::Result<Vec<CommentNode>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        Some(obj @ Value::Object(_)) => {
            let listing: Listing = serde_json::from_value(obj).map_err(D::Error::custom)?;
            nodes_from_things(listing.data.children).map_err(D::Error::custom)
        }
        _ => Ok(Vec::new()),
    }
}

/// Split the two-listing response of `/comments/<id>` into the post and its top-level nodes.
pub fn parse_thread_response(body: Value) -> Result<(RawPost, Vec<CommentNode>)> {
    let mut listings: Vec<Listing> = serde_json::from_value(body)
        .map_err(|e| ScrapeError::Network(format!("unexpected thread payload: {e}")))?;
    if listings.len() < 2 {
        return Err(ScrapeError::Network(format!(
            "unexpected thread payload: expected 2 listings, got {}",
            listings.len()
        )));
    }
    let comments = listings.remove(1);
    let post_listing = listings.remove(0);

    let post_thing = post_listing
        .data
        .children
        .into_iter()
        .find(|t| t.kind == "t3")
        .ok_or_else(|| ScrapeError::NotFound("response contains no submission".to_string()))?;
    let post: RawPost = serde_json::from_value(post_thing.data)
        .map_err(|e| ScrapeError::Network(format!("malformed submission: {e}")))?;

    let nodes = nodes_from_things(comments.data.children)?;
    Ok((post, nodes))
}

/// `{"json": {"errors": [...], "data": {"things": [...]}}}` from `/api/morechildren`.
pub fn parse_more_children_response(body: Value) -> Result<Vec<CommentNode>> {
    #[derive(Deserialize)]
    struct Envelope {
        json: Inner,
    }
    #[derive(Deserialize)]
    struct Inner {
        #[serde(default)]
        errors: Vec<Value>,
        #[serde(default)]
        data: Option<Things>,
    }
    #[derive(Deserialize)]
    struct Things {
        #[serde(default)]
        things: Vec<RawThing>,
    }

    let env: Envelope = serde_json::from_value(body)
        .map_err(|e| ScrapeError::Network(format!("unexpected morechildren payload: {e}")))?;
    if !env.json.errors.is_empty() {
        return Err(ScrapeError::Network(format!("morechildren returned errors: {:?}", env.json.errors)));
    }
    nodes_from_things(env.json.data.map(|d| d.things).unwrap_or_default())
}
