//! Video source classification
//!
//! A content record's video reference is either hosted by the embeddable
//! widget (and therefore continuity-tracked) or a plain file URL played by a
//! native element. Classification is purely syntactic.
//!
//! # Recognised widget URL shapes
//!
//! - `https://youtu.be/<id>`
//! - `https://www.youtube.com/watch?v=<id>` (also `&v=<id>` in later position)
//! - `https://www.youtube.com/embed/<id>`
//! - `.../v/<id>` and `.../u/<x>/<id>`
//!
//! The extracted id must be exactly [`WIDGET_VIDEO_ID_LEN`] characters long.
//!
//! # Example
//!
//! ```
//! use waymark_domain::VideoSource;
//!
//! let source = VideoSource::classify("https://youtu.be/dQw4w9WgXcQ").unwrap();
//! assert!(source.is_widget_hosted());
//! assert_eq!(source.widget_id().unwrap().as_str(), "dQw4w9WgXcQ");
//!
//! let file = VideoSource::classify("/media/harbour.mp4").unwrap();
//! assert!(!file.is_widget_hosted());
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::VideoId;

/// Length of a widget-hosted video identifier.
pub const WIDGET_VIDEO_ID_LEN: usize = 11;

static WIDGET_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").ok()
});

/// Where a video is played from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VideoSource {
    /// Played through the embeddable widget; eligible for a playback session.
    Widget { video_id: VideoId, url: String },
    /// Played by a native `<video>` element without continuity tracking.
    DirectFile { url: String },
}

impl VideoSource {
    /// Classify a URL. Returns `None` for empty input.
    pub fn classify(url: &str) -> Option<Self> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        Some(match extract_widget_video_id(url) {
            Some(video_id) => Self::Widget {
                video_id,
                url: url.to_string(),
            },
            None => Self::DirectFile {
                url: url.to_string(),
            },
        })
    }

    /// The original reference as authored in the catalog.
    pub fn url(&self) -> &str {
        match self {
            Self::Widget { url, .. } | Self::DirectFile { url } => url,
        }
    }

    pub fn widget_id(&self) -> Option<&VideoId> {
        match self {
            Self::Widget { video_id, .. } => Some(video_id),
            Self::DirectFile { .. } => None,
        }
    }

    pub fn is_widget_hosted(&self) -> bool {
        matches!(self, Self::Widget { .. })
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

impl TryFrom<String> for VideoSource {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::classify(&value).ok_or_else(|| DomainError::parse("video source URL is empty"))
    }
}

impl From<VideoSource> for String {
    fn from(value: VideoSource) -> Self {
        match value {
            VideoSource::Widget { url, .. } | VideoSource::DirectFile { url } => url,
        }
    }
}

/// Extract a widget video id from any of the recognised URL shapes.
pub fn extract_widget_video_id(url: &str) -> Option<VideoId> {
    let pattern = WIDGET_URL.as_ref()?;
    let candidate = pattern.captures(url)?.get(2)?.as_str();
    if candidate.chars().count() != WIDGET_VIDEO_ID_LEN {
        return None;
    }
    VideoId::parse(candidate).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn recognises_common_widget_url_shapes() {
        let urls = [
            format!("https://youtu.be/{ID}"),
            format!("https://www.youtube.com/watch?v={ID}"),
            format!("https://www.youtube.com/watch?feature=share&v={ID}"),
            format!("https://www.youtube.com/embed/{ID}?rel=0"),
            format!("https://www.youtube.com/v/{ID}#t=10"),
        ];

        for url in urls {
            let id = extract_widget_video_id(&url);
            assert_eq!(id.as_ref().map(VideoId::as_str), Some(ID), "url: {url}");
        }
    }

    #[test]
    fn ids_of_the_wrong_length_fall_back_to_direct_file() {
        let source = VideoSource::classify("https://youtu.be/short").expect("non-empty");
        assert_eq!(
            source,
            VideoSource::DirectFile {
                url: "https://youtu.be/short".to_string()
            }
        );
    }

    #[test]
    fn plain_files_are_direct() {
        let source = VideoSource::classify("https://cdn.example.org/tour.mp4").expect("non-empty");
        assert!(!source.is_widget_hosted());
        assert_eq!(source.widget_id(), None);
        assert_eq!(source.url(), "https://cdn.example.org/tour.mp4");
    }

    #[test]
    fn empty_reference_is_not_a_source() {
        assert_eq!(VideoSource::classify(""), None);
        assert_eq!(VideoSource::classify("   "), None);
        assert!(serde_json::from_str::<VideoSource>("\"\"").is_err());
    }

    #[test]
    fn deserializes_from_a_bare_url() {
        let source: VideoSource =
            serde_json::from_str(&format!("\"https://youtu.be/{ID}\"")).expect("valid source");
        assert!(source.is_widget_hosted());
        let back = serde_json::to_string(&source).expect("serializes");
        assert_eq!(back, format!("\"https://youtu.be/{ID}\""));
    }
}
