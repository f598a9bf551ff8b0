//! Error taxonomy shared by the fetch, flatten and export stages.

use thiserror::Error;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Missing or unusable credentials. Fatal: nothing is fetched.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid thread URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Bad API credentials, discovered at the first request. Fatal.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("thread not found or inaccessible: {0}")]
    NotFound(String),

    /// Transport or decode failure left over after retries.
    #[error("network error: {0}")]
    Network(String),

    #[error("export to {path} failed: {message}")]
    Export { path: String, message: String },
}

impl ScrapeError {
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into(), reason: reason.into() }
    }

    pub fn export(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Export { path: path.display().to_string(), message: err.to_string() }
    }

    /// Errors that stop the whole batch instead of a single URL.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::Config(_) | ScrapeError::Authentication(_))
    }

    /// Short machine-friendly label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Config(_) => "config",
            ScrapeError::InvalidUrl { .. } => "invalid_url",
            ScrapeError::Authentication(_) => "authentication",
            ScrapeError::NotFound(_) => "not_found",
            ScrapeError::Network(_) => "network",
            ScrapeError::Export { .. } => "export",
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::Network(err.to_string())
    }
}
