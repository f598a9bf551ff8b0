#![allow(dead_code)]

use rthread::{
    parse_more_children_response, parse_thread_response, CommentNode, CommentStream, FetchedThread, MoreComments,
    MoreLoader, Result, ScrapeError, ThreadRef, ThreadSource,
};
use serde_json::{json, Value};
use std::cell::Cell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub const EXAMPLE_URL: &str = "https://www.reddit.com/r/test/comments/abc123/title/";

/// `created_utc` used by every fixture: 2023-03-01T00:00:00Z.
pub const FIXTURE_TS: f64 = 1_677_628_800.0;

/// Submission thing as `/comments/<id>` returns it.
pub fn post_json(id: &str, title: &str, author: &str, score: i64) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id, "name": format!("t3_{id}"), "title": title, "author": author,
            "selftext": "Body of the post", "score": score, "upvote_ratio": 0.97,
            "num_comments": 2, "created_utc": FIXTURE_TS,
            "url": format!("https://www.reddit.com/r/test/comments/{id}/title/"),
            "permalink": format!("/r/test/comments/{id}/title/"), "subreddit": "test"
        }
    })
}

/// Comment thing. `replies` empty is encoded the way Reddit does it: `""`.
pub fn comment_json(id: &str, parent: &str, author: &str, body: &str, score: i64, replies: Vec<Value>) -> Value {
    let replies = if replies.is_empty() { json!("") } else { listing(replies) };
    json!({
        "kind": "t1",
        "data": {
            "id": id, "name": format!("t1_{id}"), "parent_id": parent, "author": author,
            "body": body, "score": score, "created_utc": FIXTURE_TS, "is_submitter": false,
            "permalink": format!("/r/test/comments/abc123/title/{id}/"), "replies": replies
        }
    })
}

pub fn more_json(parent: &str, children: &[&str]) -> Value {
    json!({
        "kind": "more",
        "data": { "id": children.first().copied().unwrap_or("_"), "parent_id": parent,
                  "count": children.len(), "children": children }
    })
}

pub fn continue_json(parent: &str) -> Value {
    json!({ "kind": "more", "data": { "id": "_", "name": "t1__", "parent_id": parent, "count": 0, "children": [] } })
}

pub fn listing(children: Vec<Value>) -> Value {
    json!({ "kind": "Listing", "data": { "after": null, "children": children } })
}

pub fn thread_response(post: Value, comments: Vec<Value>) -> Value {
    json!([listing(vec![post]), listing(comments)])
}

pub fn morechildren_response(things: Vec<Value>) -> Value {
    json!({ "json": { "errors": [], "data": { "things": things } } })
}

/// The `abc123` thread: a post scoring 42, one top-level comment and one reply to it.
pub fn example_thread() -> Value {
    thread_response(
        post_json("abc123", "Example title", "op_user", 42),
        vec![comment_json(
            "c1",
            "t3_abc123",
            "alice",
            "root comment",
            5,
            vec![comment_json("c2", "t1_c1", "bob", "reply to alice", 3, vec![])],
        )],
    )
}

#[derive(Clone, Copy, Debug)]
pub enum FailWith {
    NotFound,
    Network,
    Auth,
}

/// In-memory `ThreadSource`: canned `/comments` responses by submission id and
/// canned `/api/morechildren` responses by placeholder parent id.
#[derive(Default)]
pub struct FixtureSource {
    pub threads: HashMap<String, Value>,
    pub more: HashMap<String, Value>,
    pub failures: HashMap<String, FailWith>,
    pub fetch_calls: Cell<usize>,
    pub more_calls: Cell<usize>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_thread(mut self, id: &str, response: Value) -> Self {
        self.threads.insert(id.to_string(), response);
        self
    }
    pub fn with_more(mut self, parent: &str, response: Value) -> Self {
        self.more.insert(parent.to_string(), response);
        self
    }
    pub fn failing(mut self, id: &str, how: FailWith) -> Self {
        self.failures.insert(id.to_string(), how);
        self
    }
}

impl ThreadSource for FixtureSource {
    fn fetch_thread(&self, thread: &ThreadRef) -> Result<FetchedThread<'_>> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        if let Some(how) = self.failures.get(&thread.id) {
            return Err(match how {
                FailWith::NotFound => ScrapeError::NotFound(format!("thread {}: 404", thread.id)),
                FailWith::Network => ScrapeError::Network(format!("thread {}: HTTP 503", thread.id)),
                FailWith::Auth => ScrapeError::Authentication("401 Unauthorized".to_string()),
            });
        }
        let value = self
            .threads
            .get(&thread.id)
            .cloned()
            .ok_or_else(|| ScrapeError::NotFound(format!("no fixture for {}", thread.id)))?;
        let (post, roots) = parse_thread_response(value)?;
        Ok(FetchedThread { post, comments: CommentStream::new(thread.fullname(), roots, self) })
    }
}

impl MoreLoader for FixtureSource {
    fn load_more(&self, _link_id: &str, more: &MoreComments) -> Result<Vec<CommentNode>> {
        self.more_calls.set(self.more_calls.get() + 1);
        let value = self
            .more
            .get(&more.parent_id)
            .cloned()
            .ok_or_else(|| ScrapeError::Network(format!("no more fixture for {}", more.parent_id)))?;
        parse_more_children_response(value)
    }
}

/// Fresh temp directory that outlives the test (inspect it on failure).
pub fn temp_out_dir() -> PathBuf {
    tempfile::tempdir().unwrap().into_path()
}

/// Files in `dir` sorted by name, ignoring hidden temp files.
pub fn list_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Parse CSV bytes into records (header excluded).
pub fn csv_records(bytes: &[u8]) -> Vec<csv::StringRecord> {
    let mut r = csv::Reader::from_reader(bytes);
    r.records().map(|x| x.unwrap()).collect()
}

/// In-memory sink for `tracing` output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;
    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a thread-local subscriber and return its result with the captured log text.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buf.contents())
}
