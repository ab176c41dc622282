//! Read-only client for the Danbooru post API.
//!
//! Fetches randomized batches of posts for a tag query and filters them
//! down to publishable candidates. Failures are reported to the caller; the
//! scheduler retries on its next tick rather than hammering the API.

use reqwest::header::REFERER;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::BooruError;

mod models;

pub use models::{BooruPost, CandidateImage};

pub const DANBOORU_URL: &str = "https://danbooru.donmai.us";

/// Marker in `tag_string_meta` for posts whose upstream source is gone.
const BAD_ID_MARKER: &str = "bad_id";

/// Posts requested per search query.
const PAGE_LIMIT: u32 = 100;

/// The file CDN rejects requests that do not look like a browser.
const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0) Gecko/20100101 Firefox/10.0";

/// No outbound call may block the loop for longer than this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct BooruClient {
    client: Client,
}

impl BooruClient {
    pub fn new() -> Result<Self, BooruError> {
        let client = Client::builder()
            .user_agent(BROWSER_UA)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch one randomized batch of posts matching `required` and keep the
    /// ones that survive the selection filters.
    pub async fn fetch_candidates(
        &self,
        required: &[String],
        forbidden: &[String],
    ) -> Result<Vec<CandidateImage>, BooruError> {
        let tags = required.join(" ");
        let posts: Vec<BooruPost> = self
            .client
            .get(format!("{DANBOORU_URL}/posts.json"))
            .query(&[
                ("tags", tags.clone()),
                ("limit", PAGE_LIMIT.to_string()),
                ("random", "true".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let fetched = posts.len();
        let candidates: Vec<CandidateImage> = posts
            .into_iter()
            .filter_map(|post| to_candidate(post, forbidden))
            .collect();
        debug!(
            "{} of {fetched} fetched posts usable for tags '{tags}'",
            candidates.len()
        );
        Ok(candidates)
    }

    /// Download the image bytes, presenting the post page as referer so the
    /// CDN does not treat the request as hotlinking.
    pub async fn download(&self, image: &CandidateImage) -> Result<Vec<u8>, BooruError> {
        let bytes = self
            .client
            .get(&image.file_url)
            .header(REFERER, image.post_url())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

/// Apply the selection filters, in order: a usable file URL, a non-empty
/// source, no bad-id marker, no forbidden tag. The forbidden-tag check is a
/// substring match against the whole tag string, not a per-tag comparison;
/// the tests record that quirk.
fn to_candidate(post: BooruPost, forbidden: &[String]) -> Option<CandidateImage> {
    let id = post.id?;
    let file_url = post.file_url?;
    let source = post.source.filter(|s| !s.is_empty())?;

    if post
        .tag_string_meta
        .as_deref()
        .unwrap_or_default()
        .contains(BAD_ID_MARKER)
    {
        return None;
    }

    let tag_string = post.tag_string.unwrap_or_default();
    if forbidden.iter().any(|tag| tag_string.contains(tag.as_str())) {
        return None;
    }

    Some(CandidateImage {
        id,
        file_url,
        source,
        pixiv_id: post.pixiv_id,
    })
}

/// In-memory queue of publishable posts, refilled one batch at a time.
#[derive(Default)]
pub struct CandidateQueue {
    images: Vec<CandidateImage>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next candidate, refilling with a fresh random batch when empty. A
    /// failed or fully-filtered fetch yields `None` for this tick; the
    /// caller re-attempts on its next scheduling opportunity.
    pub async fn next(
        &mut self,
        client: &BooruClient,
        required: &[String],
        forbidden: &[String],
    ) -> Option<CandidateImage> {
        if self.images.is_empty() {
            match client.fetch_candidates(required, forbidden).await {
                Ok(batch) => self.images = batch,
                Err(e) => {
                    error!("failed to fetch candidate images: {e}");
                    return None;
                }
            }
        }
        self.images.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: u64) -> BooruPost {
        BooruPost {
            id: Some(id),
            file_url: Some(format!("https://cdn.example/{id}.jpg")),
            source: Some("https://artist.example/work".to_string()),
            tag_string: Some("1girl scenery outdoors".to_string()),
            tag_string_meta: Some("highres".to_string()),
            pixiv_id: None,
        }
    }

    #[test]
    fn test_complete_post_is_accepted() {
        let candidate = to_candidate(post(1), &[]).unwrap();
        assert_eq!(candidate.id, 1);
        assert_eq!(candidate.file_url, "https://cdn.example/1.jpg");
    }

    #[test]
    fn test_post_without_file_url_is_rejected() {
        let mut p = post(1);
        p.file_url = None;
        assert!(to_candidate(p, &[]).is_none());
    }

    #[test]
    fn test_post_without_source_is_rejected() {
        let mut p = post(1);
        p.source = None;
        assert!(to_candidate(p, &[]).is_none());

        let mut p = post(2);
        p.source = Some(String::new());
        assert!(to_candidate(p, &[]).is_none());
    }

    #[test]
    fn test_bad_id_marker_is_rejected() {
        let mut p = post(1);
        p.tag_string_meta = Some("highres bad_id".to_string());
        assert!(to_candidate(p, &[]).is_none());
    }

    #[test]
    fn test_forbidden_tag_is_rejected() {
        let forbidden = vec!["outdoors".to_string()];
        assert!(to_candidate(post(1), &forbidden).is_none());
    }

    #[test]
    fn test_forbidden_tags_match_as_substrings() {
        // Long-standing quirk: "cat" also knocks out posts tagged only
        // "catgirl", because the match runs against the whole tag string.
        let mut p = post(1);
        p.tag_string = Some("1girl catgirl".to_string());
        let forbidden = vec!["cat".to_string()];
        assert!(to_candidate(p, &forbidden).is_none());
    }

    #[test]
    fn test_unrelated_forbidden_tag_is_ignored() {
        let forbidden = vec!["comic".to_string()];
        assert!(to_candidate(post(1), &forbidden).is_some());
    }

    #[test]
    fn test_missing_tag_strings_default_to_empty() {
        let mut p = post(1);
        p.tag_string = None;
        p.tag_string_meta = None;
        let forbidden = vec!["comic".to_string()];
        assert!(to_candidate(p, &forbidden).is_some());
    }
}
