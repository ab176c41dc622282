//! Social platform abstraction
//!
//! One trait in front of the social network so the mention loop and the
//! publisher can be exercised against a recording mock in tests. The only
//! real implementation speaks the Mastodon API through megalodon.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::types::{Notification, StatusOptions};

pub mod mastodon;

// The mock is available for all builds (not just tests) to support
// integration tests
pub mod mock;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Current notification list for the account, newest first.
    async fn notifications(&self) -> Result<Vec<Notification>>;

    /// Create a status; returns the id of the created status.
    async fn post_status(&self, text: &str, options: &StatusOptions) -> Result<String>;

    /// Delete a status by id.
    async fn delete_status(&self, status_id: &str) -> Result<()>;

    /// Upload a media file; returns the media id to attach to a status.
    async fn upload_media(&self, path: &Path) -> Result<String>;

    /// Platform name for logs.
    fn name(&self) -> &str;
}
