//! Configuration management for boorucast

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Bot configuration, loaded once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Mastodon-compatible instance the bot posts to.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,

    /// Cycles between image posts.
    pub post_interval: u32,

    /// Tags every candidate post must match (ANDed in the search query).
    pub required_tags: Vec<String>,
    /// Tags that disqualify a candidate post.
    pub forbidden_tags: Vec<String>,

    /// Informational text sent to forwarded mentions.
    pub message: String,
    /// Maintainer account handle, without the leading `@`.
    pub maintainer: String,

    /// Path of the notification cursor file.
    pub state_file: String,
}

impl Config {
    /// Load and validate the configuration from a JSON file. `~` in the
    /// path is expanded.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let expanded = shellexpand::tilde(&path.to_string_lossy().into_owned()).into_owned();
        let content = std::fs::read_to_string(expanded).map_err(ConfigError::Read)?;
        let config: Config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.maintainer.trim().is_empty() {
            return Err(ConfigError::Invalid("maintainer must not be empty".into()));
        }
        if self.maintainer.starts_with('@') {
            return Err(ConfigError::Invalid(
                "maintainer is a bare handle, without the leading '@'".into(),
            ));
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::Invalid("access_token must not be empty".into()));
        }
        if self.post_interval == 0 {
            return Err(ConfigError::Invalid("post_interval must be at least 1".into()));
        }
        Ok(())
    }

    /// The reply sent when a mention is forwarded: the maintainer handle,
    /// then the configured message with the handle appended once more.
    pub fn forward_reply(&self) -> String {
        format!("@{0} {1} @{0}", self.maintainer, self.message)
    }

    /// State file path with `~` expanded.
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state_file).into_owned())
    }
}
