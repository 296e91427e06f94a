// Error types for huddle.
// Covers backend errors, cache errors, configuration and date strip failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuddleError {
    #[error("Backend request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired API key")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Backend error {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Missing {0} environment variable")]
    MissingConfig(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Resource id must not be empty")]
    EmptyResourceId,

    #[error("Date offset {offset} is outside the scrollable range")]
    DateOutOfRange { offset: i64 },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HuddleError>;
