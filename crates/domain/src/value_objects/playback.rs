//! Playback value types shared by the session and its adapters

use serde::{Deserialize, Serialize};

/// A position in a video, in seconds.
///
/// Always finite and non-negative; anything else collapses to zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackPosition(f64);

impl PlaybackPosition {
    pub const ZERO: Self = Self(0.0);

    pub fn new(seconds: f64) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            Self(seconds)
        } else {
            Self::ZERO
        }
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Nearest whole second, used for the widget's best-effort `start` parameter.
    pub fn whole_seconds(self) -> u32 {
        self.0.round().min(u32::MAX as f64) as u32
    }
}

impl From<f64> for PlaybackPosition {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// What happens to the session position when the video reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndedPolicy {
    /// Keep the last reported position; a remount resumes at the end.
    #[default]
    HoldPosition,
    /// Reset the position to zero so the next mount starts over.
    RewindToStart,
}

impl std::str::FromStr for EndedPolicy {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hold" | "hold_position" => Ok(Self::HoldPosition),
            "rewind" | "rewind_to_start" => Ok(Self::RewindToStart),
            other => Err(crate::DomainError::parse(format!(
                "Unknown ended policy: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_positions_collapse_to_zero() {
        assert_eq!(PlaybackPosition::new(-3.0), PlaybackPosition::ZERO);
        assert_eq!(PlaybackPosition::new(f64::NAN), PlaybackPosition::ZERO);
        assert_eq!(PlaybackPosition::new(f64::INFINITY), PlaybackPosition::ZERO);
        assert_eq!(PlaybackPosition::new(42.3).seconds(), 42.3);
    }

    #[test]
    fn whole_seconds_rounds_to_nearest() {
        assert_eq!(PlaybackPosition::new(42.3).whole_seconds(), 42);
        assert_eq!(PlaybackPosition::new(42.5).whole_seconds(), 43);
    }

    #[test]
    fn ended_policy_parses_short_and_long_names() {
        assert_eq!("hold".parse::<EndedPolicy>(), Ok(EndedPolicy::HoldPosition));
        assert_eq!(
            "Rewind_To_Start".parse::<EndedPolicy>(),
            Ok(EndedPolicy::RewindToStart)
        );
        assert!("loop".parse::<EndedPolicy>().is_err());
    }
}
