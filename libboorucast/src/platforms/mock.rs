//! Mock platform implementation for testing
//!
//! A configurable, recording platform so integration tests can drive the
//! mention loop and the publisher without credentials or network access.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{Notification, StatusOptions};

/// A status the mock accepted, kept for verification.
#[derive(Debug, Clone)]
pub struct SentStatus {
    /// Id assigned by the mock.
    pub id: String,
    pub text: String,
    pub options: StatusOptions,
}

#[derive(Default)]
struct MockState {
    notifications: Vec<Notification>,
    sent: Vec<SentStatus>,
    deleted: Vec<String>,
    uploaded: Vec<String>,
    next_status_id: u64,
    fail_notifications: bool,
    fail_posting: bool,
    fail_deleting: bool,
}

/// Shared-state mock; clones observe the same recorded activity.
#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that will serve the given notification list, newest first.
    pub fn with_notifications(notifications: Vec<Notification>) -> Self {
        let mock = Self::new();
        mock.set_notifications(notifications);
        mock
    }

    pub fn set_notifications(&self, notifications: Vec<Notification>) {
        self.state.lock().unwrap().notifications = notifications;
    }

    pub fn fail_notifications(&self, fail: bool) {
        self.state.lock().unwrap().fail_notifications = fail;
    }

    pub fn fail_posting(&self, fail: bool) {
        self.state.lock().unwrap().fail_posting = fail;
    }

    pub fn fail_deleting(&self, fail: bool) {
        self.state.lock().unwrap().fail_deleting = fail;
    }

    /// Statuses posted so far, in order.
    pub fn sent(&self) -> Vec<SentStatus> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Status ids deleted so far, in order.
    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    /// Paths of media files uploaded so far, in order.
    pub fn uploaded(&self) -> Vec<String> {
        self.state.lock().unwrap().uploaded.clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn notifications(&self) -> Result<Vec<Notification>> {
        let state = self.state.lock().unwrap();
        if state.fail_notifications {
            return Err(
                PlatformError::Network("mock notification fetch failed".to_string()).into(),
            );
        }
        Ok(state.notifications.clone())
    }

    async fn post_status(&self, text: &str, options: &StatusOptions) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if state.fail_posting {
            return Err(PlatformError::Posting("mock posting failed".to_string()).into());
        }
        state.next_status_id += 1;
        let id = format!("mock-status-{}", state.next_status_id);
        state.sent.push(SentStatus {
            id: id.clone(),
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(id)
    }

    async fn delete_status(&self, status_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deleting {
            return Err(PlatformError::Posting("mock delete failed".to_string()).into());
        }
        state.deleted.push(status_id.to_string());
        Ok(())
    }

    async fn upload_media(&self, path: &Path) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if state.fail_posting {
            return Err(PlatformError::Posting("mock upload failed".to_string()).into());
        }
        state.uploaded.push(path.display().to_string());
        Ok(format!("mock-media-{}", state.uploaded.len()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
