//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing the playback controller to drive timers, tasks and the video widget
//! without depending on concrete implementations.

pub mod platform;
pub mod video_widget_port;

pub use platform::{PollHandle, PollTimer, TaskSpawner, WidgetScriptHost};
pub use video_widget_port::{VideoWidget, WidgetEvent, WidgetEventSink, WidgetFactory, WidgetParams};

#[cfg(any(test, feature = "testing"))]
pub use video_widget_port::MockVideoWidget;
