//! Downloads a candidate image and publishes it as a media post.

use std::io::Write;
use tracing::debug;

use crate::booru::{BooruClient, CandidateImage};
use crate::error::{PublishError, Result};
use crate::platforms::Platform;
use crate::types::{ImageMimeType, StatusOptions, Visibility};

/// Fetch, validate and post one image. The caller already popped the
/// candidate from the queue and drops it whatever the outcome; a failure
/// here means the next post cycle tries a different image.
pub async fn publish(
    platform: &dyn Platform,
    booru: &BooruClient,
    image: &CandidateImage,
) -> Result<()> {
    let bytes = booru.download(image).await?;
    debug!("downloaded {} bytes for post {}", bytes.len(), image.id);

    publish_bytes(platform, image, &bytes).await
}

/// Validate downloaded bytes and post them. Split out from [`publish`] so
/// the upload path is testable without a live image board.
pub async fn publish_bytes(
    platform: &dyn Platform,
    image: &CandidateImage,
    bytes: &[u8],
) -> Result<()> {
    let Some(mime) = ImageMimeType::sniff(bytes) else {
        let mime = infer::get(bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return Err(PublishError::UnsupportedMime {
            mime,
            url: image.file_url.clone(),
        }
        .into());
    };

    // The platform uploads from a path, so spool the bytes through a temp
    // file carrying the sniffed extension.
    let mut spool = tempfile::Builder::new()
        .prefix("boorucast-")
        .suffix(&format!(".{}", mime.extension()))
        .tempfile()
        .map_err(PublishError::Spool)?;
    spool.write_all(bytes).map_err(PublishError::Spool)?;
    spool.flush().map_err(PublishError::Spool)?;

    let media_id = platform.upload_media(spool.path()).await?;

    let options = StatusOptions {
        media_ids: vec![media_id],
        visibility: Some(Visibility::Unlisted),
        sensitive: true,
        ..Default::default()
    };
    platform.post_status(&caption(image), &options).await?;

    Ok(())
}

/// Status text: the board permalink plus the attribution line.
fn caption(image: &CandidateImage) -> String {
    format!("{}\nsource: {}", image.post_url(), image.source_line())
}
