//! API client adapter: the `ThreadSource` seam, and `RedditApi`, its implementation
//! over Reddit's OAuth JSON API. HTTP, TLS and connection reuse are reqwest's job;
//! this layer only knows endpoints, the app-only token grant and status mapping.

use crate::config::Credentials;
use crate::error::{Result, ScrapeError};
use crate::flatten::{CommentStream, MoreLoader};
use crate::model::{parse_more_children_response, parse_thread_response, CommentNode, MoreComments, RawPost};
use crate::thread_url::ThreadRef;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// A fetched post plus its comments as a lazy pre-order stream.
pub struct FetchedThread<'a> {
    pub post: RawPost,
    pub comments: CommentStream<'a>,
}

/// Anything that can turn a thread reference into a post and a comment stream.
pub trait ThreadSource {
    fn fetch_thread(&self, thread: &ThreadRef) -> Result<FetchedThread<'_>>;
}

impl<T: ThreadSource + ?Sized> ThreadSource for &T {
    fn fetch_thread(&self, thread: &ThreadRef) -> Result<FetchedThread<'_>> {
        (**self).fetch_thread(thread)
    }
}

/// Endpoint and retry settings with defaults for the public Reddit API.
#[derive(Clone, Debug)]
pub struct ApiOptions {
    pub auth_url: String,
    pub api_base: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub retry_delay: Duration,
    /// `limit` passed to `/comments/<id>`; Reddit caps it at 500.
    pub comment_limit: usize,
    /// Ids per `/api/morechildren` call; Reddit accepts at most 100.
    pub more_batch_size: usize,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            auth_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            api_base: "https://oauth.reddit.com".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            comment_limit: 500,
            more_batch_size: 100,
        }
    }
}

impl ApiOptions {
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn with_retries(mut self, max_retries: usize, delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = delay;
        self
    }
    pub fn with_comment_limit(mut self, limit: usize) -> Self {
        self.comment_limit = limit.clamp(1, 500);
        self
    }
    pub fn with_more_batch_size(mut self, n: usize) -> Self {
        self.more_batch_size = n.clamp(1, 100);
        self
    }
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<Value>,
}

pub struct RedditApi {
    http: Client,
    credentials: Credentials,
    opts: ApiOptions,
    token: RefCell<Option<AccessToken>>,
}

impl RedditApi {
    pub fn new(credentials: Credentials, opts: ApiOptions) -> Result<Self> {
        let http = Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(opts.timeout)
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { http, credentials, opts, token: RefCell::new(None) })
    }

    pub fn options(&self) -> &ApiOptions {
        &self.opts
    }

    /// Cached app-only bearer token, refreshed a minute before it expires.
    fn access_token(&self) -> Result<String> {
        if let Some(tok) = self.token.borrow().as_ref() {
            if Instant::now() < tok.expires_at {
                return Ok(tok.value.clone());
            }
        }
        let fresh = self.request_token()?;
        let value = fresh.value.clone();
        *self.token.borrow_mut() = Some(fresh);
        Ok(value)
    }

    fn request_token(&self) -> Result<AccessToken> {
        tracing::debug!(url = %self.opts.auth_url, "Requesting access token");
        let resp = self.send_with_retries(|| {
            self.http
                .post(&self.opts.auth_url)
                .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
                .form(&[("grant_type", "client_credentials")])
        })?;

        let status = resp.status();
        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(ScrapeError::Authentication(format!("token endpoint answered {status}")));
        }
        classify_status(status, "access token")?;

        let body: TokenResponse = resp
            .json()
            .map_err(|e| ScrapeError::Network(format!("unexpected token payload: {e}")))?;
        let value = match (body.access_token, body.error) {
            (Some(t), None) if !t.is_empty() => t,
            (_, Some(err)) => return Err(ScrapeError::Authentication(format!("token request rejected: {err}"))),
            _ => return Err(ScrapeError::Authentication("token response has no access_token".to_string())),
        };
        let ttl = body.expires_in.unwrap_or(3600).saturating_sub(60);
        Ok(AccessToken { value, expires_at: Instant::now() + Duration::from_secs(ttl) })
    }

    /// Authenticated GET returning the decoded JSON body.
    fn get_json(&self, path: &str, query: &[(&str, String)], what: &str) -> Result<Value> {
        let token = self.access_token()?;
        let url = format!("{}{}", self.opts.api_base, path);
        let resp = self.send_with_retries(|| self.http.get(&url).bearer_auth(&token).query(query))?;
        classify_status(resp.status(), what)?;
        resp.json::<Value>().map_err(|e| ScrapeError::Network(format!("cannot decode {what}: {e}")))
    }

    /// Send, retrying transport errors and transient statuses with linear backoff.
    /// The last response is returned as-is so callers can classify it.
    fn send_with_retries(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let tries = self.opts.max_retries + 1;
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let last = attempt >= tries;
            match build().send() {
                Ok(resp) if is_retriable_status(resp.status()) && !last => {
                    tracing::debug!(status = %resp.status(), attempt, "Transient HTTP status; retrying");
                }
                Ok(resp) => return Ok(resp),
                Err(e) if is_retriable_error(&e) && !last => {
                    tracing::debug!(error = %e, attempt, "Transport error; retrying");
                }
                Err(e) => return Err(e.into()),
            }
            sleep(self.opts.retry_delay.saturating_mul(attempt as u32));
        }
    }

    fn load_continue_thread(&self, link_id: &str, more: &MoreComments) -> Result<Vec<CommentNode>> {
        let post = strip_kind(link_id);
        let parent = strip_kind(&more.parent_id);
        let value = self.get_json(
            &format!("/comments/{post}/_/{parent}"),
            &[("raw_json", "1".to_string()), ("limit", self.opts.comment_limit.to_string())],
            "continued thread",
        )?;
        let (_, nodes) = parse_thread_response(value)?;

        // The response is rooted at the parent comment itself, which was already emitted.
        let mut out = Vec::new();
        for node in nodes {
            match node {
                CommentNode::Comment(c) if c.fullname() == more.parent_id => out.extend(c.replies),
                other => out.push(other),
            }
        }
        Ok(out)
    }

    fn load_more_children(&self, link_id: &str, more: &MoreComments) -> Result<Vec<CommentNode>> {
        let mut out = Vec::with_capacity(more.children.len());
        for chunk in more.children.chunks(self.opts.more_batch_size) {
            let value = self.get_json(
                "/api/morechildren",
                &[
                    ("api_type", "json".to_string()),
                    ("raw_json", "1".to_string()),
                    ("link_id", link_id.to_string()),
                    ("children", chunk.join(",")),
                ],
                "more comments",
            )?;
            out.extend(parse_more_children_response(value)?);
        }
        Ok(out)
    }
}

impl ThreadSource for RedditApi {
    fn fetch_thread(&self, thread: &ThreadRef) -> Result<FetchedThread<'_>> {
        let value = self.get_json(
            &format!("/comments/{}", thread.id),
            &[("raw_json", "1".to_string()), ("limit", self.opts.comment_limit.to_string())],
            &format!("thread {thread}"),
        )?;
        let (post, roots) = parse_thread_response(value)?;
        let link_id = if post.name.is_empty() { thread.fullname() } else { post.name.clone() };
        Ok(FetchedThread { post, comments: CommentStream::new(link_id, roots, self) })
    }
}

impl MoreLoader for RedditApi {
    fn load_more(&self, link_id: &str, more: &MoreComments) -> Result<Vec<CommentNode>> {
        if more.is_continue_thread() {
            self.load_continue_thread(link_id, more)
        } else {
            self.load_more_children(link_id, more)
        }
    }
}

/// Map a final HTTP status to the error taxonomy.
pub fn classify_status(status: StatusCode, what: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED => Err(ScrapeError::Authentication(format!("{what}: {status}"))),
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND | StatusCode::GONE => {
            Err(ScrapeError::NotFound(format!("{what}: {status}")))
        }
        _ => Err(ScrapeError::Network(format!("{what}: HTTP {status}"))),
    }
}

pub fn is_retriable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retriable_error(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request()
}

/// `t1_abc` → `abc`; ids without a kind prefix pass through.
pub fn strip_kind(fullname: &str) -> &str {
    match fullname.split_once('_') {
        Some((kind, rest)) if kind.len() == 2 && kind.starts_with('t') => rest,
        _ => fullname,
    }
}
