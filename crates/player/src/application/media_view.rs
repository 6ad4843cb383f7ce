//! Which kind of player a content record needs.

use waymark_domain::{VideoId, VideoSource};

pub const DIRECT_FILE_MIME: &str = "video/mp4";
pub const DIRECT_FILE_PRELOAD: &str = "metadata";

/// Media presentation selected by inspecting a record's video source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaView {
    /// No video at all.
    Absent,
    /// Widget-hosted video with continuity tracking.
    Tracked { video_id: VideoId },
    /// Native `<video>` element; no session, no continuity.
    Direct { url: String, mime: &'static str },
}

impl MediaView {
    pub fn for_source(source: Option<&VideoSource>) -> Self {
        match source {
            None => Self::Absent,
            Some(VideoSource::Widget { video_id, .. }) => Self::Tracked {
                video_id: video_id.clone(),
            },
            Some(VideoSource::DirectFile { url }) => Self::Direct {
                url: url.clone(),
                mime: DIRECT_FILE_MIME,
            },
        }
    }

    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::Tracked { .. })
    }
}
