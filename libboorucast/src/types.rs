//! Core types shared between the notification loop, the publisher and the
//! platform implementations.

/// A notification from the social account, reduced to what the bot acts on.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Totally ordered id; the dedup/progress key for the cursor.
    pub id: u64,
    pub kind: NotificationKind,
    /// The status that triggered the notification, when there is one.
    pub status: Option<StatusInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Mention,
    /// Boosts, favourites, follows and anything else the bot ignores.
    Other,
}

/// The status a notification points at.
#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub id: String,
    /// Rendered HTML as served by the instance.
    pub content_html: String,
    /// Sender handle (`user` or `user@instance`), no leading `@`.
    pub sender: String,
    pub visibility: Visibility,
    /// Handles tagged in the status, no leading `@`.
    pub mentioned: Vec<String>,
    /// Id of the status this one replies to.
    pub in_reply_to_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
    Direct,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Options for creating a status.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    pub in_reply_to_id: Option<String>,
    pub media_ids: Vec<String>,
    pub visibility: Option<Visibility>,
    pub sensitive: bool,
}

impl StatusOptions {
    /// A direct-visibility reply to the given status.
    pub fn direct_reply(to: impl Into<String>) -> Self {
        Self {
            in_reply_to_id: Some(to.into()),
            visibility: Some(Visibility::Direct),
            ..Default::default()
        }
    }
}

/// Image types the bot is willing to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMimeType {
    Jpeg,
    Png,
    Gif,
}

impl ImageMimeType {
    /// Parse a MIME string (e.g. "image/jpeg").
    pub fn from_mime_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Sniff the type from the file's magic bytes. The server-declared
    /// content type is never consulted.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        infer::get(data).and_then(|kind| Self::from_mime_str(kind.mime_type()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    /// Typical file extension for this type.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

impl std::fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
