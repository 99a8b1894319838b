//! jobfetch: job-posting acquisition and structured extraction
//!
//! This crate fetches job postings from arbitrary web pages or known job boards,
//! escalating through several fetch mechanisms when a portal blocks automated
//! access, and turns the returned HTML into a normalized [`StructuredJobPosting`].

pub mod config;
pub mod extract;
pub mod fetch;
pub mod parsers;
pub mod pipeline;
pub mod posting;
pub mod url;

use thiserror::Error;

/// Main error type for job fetching operations
///
/// The `Display` text of every variant is safe to show to end users: it never names
/// the fetch mechanism or proxy vendor that produced the failure.
#[derive(Debug, Error)]
pub enum JobFetchError {
    #[error(
        "The job portal blocked automated access to {url}. Please copy the job posting text and paste it manually."
    )]
    Blocked { url: String },

    #[error("The job posting at {url} was not found (HTTP 404). Please check the URL.")]
    NotFound { url: String },

    #[error("The job portal is rate limiting requests (HTTP 429). Please retry later.")]
    RateLimited { url: String },

    #[error("The job portal returned HTTP {status} for {url}.")]
    Http { url: String, status: u16 },

    #[error(
        "The job posting at {url} could not be loaded. Please copy the job posting text and paste it manually."
    )]
    Unreachable { url: String },

    #[error("The page at {url} could not be read as a job posting: {reason}")]
    Unparseable { url: String, reason: String },

    #[error("Invalid job URL: {0}")]
    Url(#[from] UrlError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl JobFetchError {
    /// Returns true if the user should fall back to pasting the posting text
    pub fn suggests_manual_paste(&self) -> bool {
        matches!(self, Self::Blocked { .. } | Self::Unreachable { .. })
    }

    /// Returns the HTTP status code behind this error, if there is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Blocked { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for job fetching operations
pub type Result<T> = std::result::Result<T, JobFetchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::{Config, Deployment};
pub use crate::parsers::{detect_job_board, BoardId};
pub use crate::pipeline::JobFetcher;
pub use crate::posting::{
    EmailLink, JobSource, PageLink, PartialPosting, RawJobPosting, StructuredJobPosting,
};
pub use crate::url::normalize_job_url;
