//! Mastodon platform implementation
//!
//! Wraps the megalodon client and maps its entities onto the bot's own
//! types, so nothing outside this module depends on the SDK's shapes.

use async_trait::async_trait;
use megalodon::entities;
use megalodon::entities::UploadMedia;
use megalodon::megalodon::{PostStatusInputOptions, PostStatusOutput};
use megalodon::{Megalodon, SNS};
use std::path::Path;
use tracing::warn;

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{Notification, NotificationKind, StatusInfo, StatusOptions, Visibility};

pub struct MastodonClient {
    client: Box<dyn Megalodon + Send + Sync>,
}

impl MastodonClient {
    pub fn new(instance_url: String, access_token: String) -> Result<Self> {
        let client = megalodon::generator(SNS::Mastodon, instance_url, Some(access_token), None)
            .map_err(|e| {
                PlatformError::Authentication(format!("Failed to create Mastodon client: {:?}", e))
            })?;

        Ok(Self { client })
    }

    /// Create a client from the bot configuration. The instance URL gains an
    /// `https://` prefix when none is given.
    pub fn from_config(config: &Config) -> Result<Self> {
        let instance_url = if config.base_url.starts_with("http://")
            || config.base_url.starts_with("https://")
        {
            config.base_url.clone()
        } else {
            format!("https://{}", config.base_url)
        };

        Self::new(instance_url, config.access_token.clone())
    }
}

#[async_trait]
impl Platform for MastodonClient {
    async fn notifications(&self) -> Result<Vec<Notification>> {
        let response = self
            .client
            .get_notifications(None)
            .await
            .map_err(|e| map_megalodon_error(e, "fetch notifications"))?;

        Ok(response
            .json
            .into_iter()
            .filter_map(map_notification)
            .collect())
    }

    async fn post_status(&self, text: &str, options: &StatusOptions) -> Result<String> {
        let media_ids = if options.media_ids.is_empty() {
            None
        } else {
            Some(options.media_ids.clone())
        };
        let opts = PostStatusInputOptions {
            media_ids,
            in_reply_to_id: options.in_reply_to_id.clone(),
            sensitive: options.sensitive.then_some(true),
            visibility: options.visibility.map(visibility_to_megalodon),
            ..Default::default()
        };

        let response = self
            .client
            .post_status(text.to_string(), Some(&opts))
            .await
            .map_err(|e| map_megalodon_error(e, "post status"))?;

        let status_id = match response.json {
            PostStatusOutput::Status(status) => status.id,
            PostStatusOutput::ScheduledStatus(scheduled) => scheduled.id,
        };

        Ok(status_id)
    }

    async fn delete_status(&self, status_id: &str) -> Result<()> {
        self.client
            .delete_status(status_id.to_string())
            .await
            .map_err(|e| map_megalodon_error(e, "delete status"))?;

        Ok(())
    }

    async fn upload_media(&self, path: &Path) -> Result<String> {
        let response = self
            .client
            .upload_media(path.to_string_lossy().into_owned(), None)
            .await
            .map_err(|e| map_megalodon_error(e, "upload media"))?;

        // Async attachments are referenced by id without waiting; the
        // instance finishes processing before the status is created.
        let media_id = match response.json {
            UploadMedia::Attachment(attachment) => attachment.id,
            UploadMedia::AsyncAttachment(attachment) => attachment.id,
        };

        Ok(media_id)
    }

    fn name(&self) -> &str {
        "mastodon"
    }
}

/// Reduce a megalodon notification to the fields the bot acts on. Mastodon
/// serves decimal-string ids; anything non-numeric (other Fediverse
/// software) is dropped with a warning instead of wedging the loop.
fn map_notification(notification: entities::Notification) -> Option<Notification> {
    let id = match notification.id.parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            warn!(
                "skipping notification with non-numeric id {:?}",
                notification.id
            );
            return None;
        }
    };

    let kind = match notification.r#type {
        entities::notification::NotificationType::Mention => NotificationKind::Mention,
        _ => NotificationKind::Other,
    };

    let status = notification.status.map(|status| StatusInfo {
        id: status.id,
        content_html: status.content,
        sender: status.account.acct,
        visibility: visibility_from_megalodon(status.visibility),
        mentioned: status.mentions.into_iter().map(|m| m.acct).collect(),
        in_reply_to_id: status.in_reply_to_id,
    });

    Some(Notification { id, kind, status })
}

fn visibility_from_megalodon(visibility: entities::status::StatusVisibility) -> Visibility {
    match visibility {
        entities::status::StatusVisibility::Public => Visibility::Public,
        entities::status::StatusVisibility::Unlisted => Visibility::Unlisted,
        entities::status::StatusVisibility::Private => Visibility::Private,
        entities::status::StatusVisibility::Direct => Visibility::Direct,
    }
}

fn visibility_to_megalodon(visibility: Visibility) -> entities::status::StatusVisibility {
    match visibility {
        Visibility::Public => entities::status::StatusVisibility::Public,
        Visibility::Unlisted => entities::status::StatusVisibility::Unlisted,
        Visibility::Private => entities::status::StatusVisibility::Private,
        Visibility::Direct => entities::status::StatusVisibility::Direct,
    }
}

/// Map megalodon errors to PlatformError. The megalodon error type does not
/// expose a structured status code, so this reads the one embedded in the
/// message.
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> PlatformError {
    let message = format!("Mastodon error ({context}): {error}");

    match extract_http_status(&error.to_string()) {
        Some(401) | Some(403) => PlatformError::Authentication(message),
        Some(422) => PlatformError::Validation(message),
        Some(429) => PlatformError::RateLimit(message),
        _ => PlatformError::Network(message),
    }
}

/// Extract an HTTP status code from an error message string.
fn extract_http_status(error_str: &str) -> Option<u16> {
    let prefixes = ["HTTP ", "status ", "status_code: ", "code: "];

    for prefix in &prefixes {
        if let Some(pos) = error_str.find(prefix) {
            if let Some(code_str) = error_str[pos + prefix.len()..].get(0..3) {
                if let Ok(code) = code_str.parse::<u16>() {
                    if (100..=599).contains(&code) {
                        return Some(code);
                    }
                }
            }
        }
    }

    None
}
