//! Notification processing: auto-replies, forwarding to the maintainer and
//! the maintainer's delete command.

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::Result;
use crate::platforms::Platform;
use crate::state::CursorFile;
use crate::text::{html_to_text, sanitize_forwarded, split_into_posts};
use crate::types::{NotificationKind, StatusInfo, StatusOptions};

/// Token a maintainer puts in a reply to make the bot delete the post the
/// reply points at.
pub const DELETE_COMMAND: &str = "$delete";

/// Poll the account's notifications and handle every mention newer than the
/// cursor. The cursor is persisted before returning whenever it moved; a
/// fetch failure propagates with the cursor untouched, so the next cycle
/// retries the same window.
pub async fn process_notifications(
    platform: &dyn Platform,
    config: &Config,
    state: &mut CursorFile,
) -> Result<()> {
    let notifications = platform.notifications().await?;

    let Some(mut cursor) = state.cursor() else {
        // First run: seed past whatever already exists instead of answering
        // a backlog of old mentions.
        let newest = notifications.first().map(|n| n.id).unwrap_or(0);
        debug!("ignoring previous notifications up to {newest}");
        state.advance(newest);
        state.persist()?;
        return Ok(());
    };

    let mut changed = false;
    // The list arrives newest first; walk it in chronological order.
    for notification in notifications.iter().rev() {
        if notification.id <= cursor {
            continue;
        }

        debug!("handling notification {}", notification.id);
        // Advance before acting, so a failure below cannot replay the same
        // notification on the next cycle. Lost replies beat duplicated ones.
        cursor = notification.id;
        state.advance(notification.id);
        changed = true;

        if notification.kind != NotificationKind::Mention {
            continue;
        }
        let Some(status) = &notification.status else {
            continue;
        };

        if let Err(e) = respond_to_mention(platform, config, status).await {
            error!("failed to respond to mention {}: {e}", notification.id);
        }
    }

    if changed {
        state.persist()?;
    }

    Ok(())
}

/// Handle a single mention: the delete command, then forwarding, then the
/// direct-message relay.
async fn respond_to_mention(
    platform: &dyn Platform,
    config: &Config,
    status: &StatusInfo,
) -> Result<()> {
    let text = sanitize_forwarded(&html_to_text(&status.content_html));
    let from_maintainer = status.sender == config.maintainer;

    if text.contains(DELETE_COMMAND) {
        if !from_maintainer {
            // Delete requests from anyone else are dropped without a reply.
            return Ok(());
        }
        match &status.in_reply_to_id {
            Some(target) => {
                if let Err(e) = platform.delete_status(target).await {
                    error!("failed to delete status {target}: {e}");
                }
            }
            None => debug!("delete command without a reply target, nothing to do"),
        }
    }

    if from_maintainer {
        return Ok(());
    }

    if status.mentioned.iter().any(|acct| acct == &config.maintainer) {
        // The maintainer already sees this thread; no need to forward.
        return Ok(());
    }

    let reply_id = platform
        .post_status(
            &config.forward_reply(),
            &StatusOptions::direct_reply(status.id.clone()),
        )
        .await?;

    if !status.visibility.is_public() {
        // The mention was a DM, so its content has to be relayed too.
        let prefix = format!("@{}", config.maintainer);
        let mut previous = reply_id;
        for part in split_into_posts(&prefix, &text) {
            previous = platform
                .post_status(&part, &StatusOptions::direct_reply(previous))
                .await?;
        }
    }

    info!("responded to status {} from {}", status.id, status.sender);

    Ok(())
}
