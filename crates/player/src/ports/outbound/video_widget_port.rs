//! Video widget ports - the boundary to the externally hosted player
//!
//! The widget is constructed through a [`WidgetFactory`] (available once the
//! widget script is loaded), reports lifecycle changes through a
//! [`WidgetEventSink`], and is driven through the imperative [`VideoWidget`]
//! surface. Nothing here knows about sessions or mount sites.

use std::rc::Rc;

use waymark_domain::{PlaybackPosition, VideoId, WidgetErrorCode, WidgetPlayerState};

use crate::application::error::AdapterConstructionError;

/// Construction parameters for one widget instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetParams {
    /// Element id of the render surface the widget replaces.
    pub target_id: String,
    pub video_id: VideoId,
    pub plays_inline: bool,
    pub autoplay: bool,
    pub controls: bool,
    /// Best-effort start offset; the widget may ignore it.
    pub start: PlaybackPosition,
}

impl WidgetParams {
    /// `start` as the whole-second value the widget accepts.
    pub fn start_seconds(&self) -> u32 {
        self.start.whole_seconds()
    }
}

/// Notifications delivered by a widget instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetEvent {
    Ready,
    StateChanged(WidgetPlayerState),
    Error(WidgetErrorCode),
}

/// Callback the widget uses to report [`WidgetEvent`]s.
pub type WidgetEventSink = Rc<dyn Fn(WidgetEvent)>;

/// Imperative surface of a constructed widget.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait VideoWidget {
    fn play(&self);

    fn pause(&self);

    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool);

    /// Current playback position, or `None` when the widget cannot answer
    /// synchronously.
    fn current_time(&self) -> Option<f64>;

    /// Tear down the widget instance and its render surface content.
    fn destroy(&self);
}

/// Builds widget instances once the widget script is available.
pub trait WidgetFactory {
    fn construct(
        &self,
        params: WidgetParams,
        events: WidgetEventSink,
    ) -> Result<Box<dyn VideoWidget>, AdapterConstructionError>;
}
