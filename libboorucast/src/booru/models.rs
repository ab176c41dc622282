use serde::Deserialize;

use super::DANBOORU_URL;

/// Danbooru post payload, kept to the fields the bot inspects. The API
/// omits fields freely, so everything is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct BooruPost {
    pub id: Option<u64>,
    pub file_url: Option<String>,
    pub source: Option<String>,
    pub tag_string: Option<String>,
    pub tag_string_meta: Option<String>,
    pub pixiv_id: Option<u64>,
}

/// A post that survived the selection filters and can be published.
#[derive(Debug, Clone)]
pub struct CandidateImage {
    pub id: u64,
    pub file_url: String,
    pub source: String,
    pub pixiv_id: Option<u64>,
}

impl CandidateImage {
    /// Permalink of the post on the image board.
    pub fn post_url(&self) -> String {
        format!("{DANBOORU_URL}/posts/{}", self.id)
    }

    /// Canonical attribution line: the Pixiv illustration page when the
    /// board knows the origin id, the raw source field otherwise.
    pub fn source_line(&self) -> String {
        match self.pixiv_id {
            Some(illust_id) => format!(
                "https://www.pixiv.net/member_illust.php?mode=medium&illust_id={illust_id}"
            ),
            None => self.source.clone(),
        }
    }
}
