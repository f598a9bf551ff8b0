use crate::error::{Result, ScrapeError};
use crate::export::ExportFormat;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";

/// Reddit "script"/"web" app credentials, read from a JSON file:
/// `{"client_id": "...", "client_secret": "...", "user_agent": "..."}`.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub user_agent: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into(), user_agent: user_agent.into() }
    }

    /// Load from `path`, apply `REDDIT_*` environment overrides, then validate.
    /// A missing file is fine when the environment supplies every field.
    pub fn load(path: &Path) -> Result<Self> {
        let base = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| ScrapeError::Config(format!("cannot read {}: {e}", path.display())))?;
            Self::from_json_str(&raw)
                .map_err(|e| ScrapeError::Config(format!("{}: {e}", path.display())))?
        } else {
            tracing::debug!(path = %path.display(), "Credentials file not found; relying on environment");
            Self::default()
        };

        let creds = base.with_overrides(|key| std::env::var(key).ok());
        creds.validate().map_err(|e| match e {
            ScrapeError::Config(msg) if !path.exists() => ScrapeError::Config(format!(
                "{msg} (no credentials file at {}; create it or set {ENV_CLIENT_ID}/{ENV_CLIENT_SECRET}/{ENV_USER_AGENT})",
                path.display()
            )),
            other => other,
        })?;
        Ok(creds)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ScrapeError::Config(format!("invalid credentials JSON: {e}")))
    }

    /// Non-blank values returned by `lookup` replace the file values.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |key: &str, slot: &mut String| {
            if let Some(v) = lookup(key) {
                let v = v.trim();
                if !v.is_empty() {
                    *slot = v.to_string();
                }
            }
        };
        pick(ENV_CLIENT_ID, &mut self.client_id);
        pick(ENV_CLIENT_SECRET, &mut self.client_secret);
        pick(ENV_USER_AGENT, &mut self.user_agent);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.client_id.trim().is_empty() { missing.push("client_id"); }
        if self.client_secret.trim().is_empty() { missing.push("client_secret"); }
        if self.user_agent.trim().is_empty() { missing.push("user_agent"); }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ScrapeError::Config(format!("missing credentials: {}", missing.join(", "))))
        }
    }
}

/// Run options with defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ScrapeOptions {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub preview_chars: usize, // body truncation for console output
    pub combined: bool,       // write a combined file when >1 thread succeeded
    pub progress: bool,       // show a progress bar over the URL batch
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: ExportFormat::Console,
            preview_chars: 500,
            combined: true,
            progress: false,
        }
    }
}

impl ScrapeOptions {
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }
    pub fn with_preview_chars(mut self, n: usize) -> Self {
        self.preview_chars = n.max(1);
        self
    }
    pub fn with_combined(mut self, yes: bool) -> Self {
        self.combined = yes;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
}
