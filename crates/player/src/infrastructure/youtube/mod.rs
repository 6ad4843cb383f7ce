//! YouTube IFrame Player API bindings (browser only).

mod script_host;
mod widget;

pub use script_host::YoutubeScriptHost;
pub use widget::{YoutubeWidget, YoutubeWidgetFactory};
