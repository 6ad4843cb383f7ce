//! Error taxonomy for the playback controller
//!
//! Every error here is absorbed at the playback session boundary and turned
//! into an "unavailable" presentation; none of them escape into the view as a
//! panic.

use thiserror::Error;
use waymark_domain::{LocationId, VideoId, WidgetErrorCode};

/// The widget script could not be fetched or never exposed its API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetLoadError {
    #[error("widget script {url} failed to load: {reason}")]
    ScriptFailed { url: String, reason: String },

    #[error("widget API did not become available: {0}")]
    ApiUnavailable(String),

    #[error("widget-hosted video is not supported on this platform")]
    Unsupported,
}

impl WidgetLoadError {
    pub fn script_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ScriptFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// The widget refused to construct a player for the given source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("widget rejected video {video_id}: {reason}")]
pub struct AdapterConstructionError {
    pub video_id: VideoId,
    pub reason: String,
}

impl AdapterConstructionError {
    pub fn new(video_id: VideoId, reason: impl Into<String>) -> Self {
        Self {
            video_id,
            reason: reason.into(),
        }
    }
}

/// Anything that makes a playback session unplayable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    WidgetLoad(#[from] WidgetLoadError),

    #[error(transparent)]
    Construction(#[from] AdapterConstructionError),

    #[error("playback failed: {0}")]
    Widget(WidgetErrorCode),
}

impl PlaybackError {
    /// Text for the unavailable notice shown in place of the player.
    pub fn user_message(&self) -> String {
        match self {
            Self::WidgetLoad(WidgetLoadError::Unsupported) => {
                "Video playback is not available here.".to_string()
            }
            Self::WidgetLoad(_) => "The video player could not be loaded.".to_string(),
            Self::Construction(_) => "This video could not be opened.".to_string(),
            Self::Widget(code) => format!("Video unavailable: {}.", code.description()),
        }
    }
}

/// A selected scene location has no catalog entry. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no content found for location {location_id}")]
pub struct UnresolvedSelectionWarning {
    pub location_id: LocationId,
}

/// Violations of the one-adapter-per-session rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("adapter {incoming} cannot bind while adapter {bound} is still bound")]
    AdapterAlreadyBound { bound: u64, incoming: u64 },

    #[error("session is {0} and no longer accepts adapters")]
    NotBindable(&'static str),
}

/// Reasons a mount site could not host a player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("no playback session is active")]
    NoSession,

    #[error("the {requested} site is not the active presentation ({active})")]
    InactiveSite {
        requested: &'static str,
        active: &'static str,
    },

    #[error("session is unplayable: {0}")]
    Unplayable(PlaybackError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_convert_into_playback_errors() {
        let err: PlaybackError = WidgetLoadError::Unsupported.into();
        assert_eq!(err.user_message(), "Video playback is not available here.");
    }

    #[test]
    fn widget_codes_surface_in_the_user_message() {
        let err = PlaybackError::Widget(WidgetErrorCode::NotFound);
        assert!(err.user_message().contains("removed or is private"));
    }
}
