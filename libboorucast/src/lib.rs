//! boorucast - an image bot bridging Danbooru and the Fediverse
//!
//! This library holds everything the daemon binary orchestrates: the image
//! board client, the publisher, the notification processor, and the
//! configuration/state/logging plumbing around them.

pub mod booru;
pub mod config;
pub mod error;
pub mod logging;
pub mod mentions;
pub mod platforms;
pub mod publisher;
pub mod state;
pub mod text;
pub mod types;

// Re-export commonly used types
pub use booru::{BooruClient, CandidateImage, CandidateQueue};
pub use config::Config;
pub use error::{BoorucastError, Result};
pub use state::CursorFile;
