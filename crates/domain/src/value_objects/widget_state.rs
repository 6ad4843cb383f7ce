//! Widget-native player states and error codes
//!
//! The embeddable widget reports its state as small integers and its failures
//! as numeric codes. These types give them names so that adapters never match
//! on raw numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State reported by the widget's state-change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetPlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl WidgetPlayerState {
    /// Map the widget's numeric state code. Unknown codes yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }

    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Error code reported by the widget's error notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetErrorCode {
    /// The request contained an invalid parameter value (code 2)
    InvalidParameter,
    /// The content cannot be played in the HTML5 player (code 5)
    Html5Player,
    /// The video was not found, removed, or marked private (code 100)
    NotFound,
    /// The owner does not allow embedded playback (codes 101 and 150)
    EmbeddingNotAllowed,
    /// Any code this crate does not know about
    Other(i32),
}

impl WidgetErrorCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::InvalidParameter,
            5 => Self::Html5Player,
            100 => Self::NotFound,
            101 | 150 => Self::EmbeddingNotAllowed,
            other => Self::Other(other),
        }
    }

    /// Short human readable explanation, suitable for the unavailable notice.
    pub fn description(self) -> &'static str {
        match self {
            Self::InvalidParameter => "the video reference is invalid",
            Self::Html5Player => "the video cannot be played in this browser",
            Self::NotFound => "the video was removed or is private",
            Self::EmbeddingNotAllowed => "the owner does not allow embedded playback",
            Self::Other(_) => "the video player reported an error",
        }
    }
}

impl fmt::Display for WidgetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "{} (code {code})", self.description()),
            _ => f.write_str(self.description()),
        }
    }
}
