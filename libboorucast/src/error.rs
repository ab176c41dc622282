//! Error types for boorucast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoorucastError>;

#[derive(Error, Debug)]
pub enum BoorucastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State file error: {0}")]
    State(#[from] StateError),

    #[error("Image board error: {0}")]
    Booru(#[from] BooruError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

impl BoorucastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BoorucastError::Config(_) => 2,
            BoorucastError::Platform(PlatformError::Authentication(_)) => 2,
            BoorucastError::State(_)
            | BoorucastError::Booru(_)
            | BoorucastError::Platform(_)
            | BoorucastError::Publish(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum BooruError {
    #[error("Image board request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Unsupported media type {mime} for {url}")]
    UnsupportedMime { mime: String, url: String },

    #[error("Failed to spool media to disk: {0}")]
    Spool(#[from] std::io::Error),
}
