//! WASM platform implementations
//!
//! Browser intervals through `gloo-timers`, tasks through
//! `wasm-bindgen-futures`, and the hosted widget script through
//! [`YoutubeScriptHost`].

use futures_util::future::LocalBoxFuture;
use gloo_timers::callback::Interval;

use crate::config::PlayerConfig;
use crate::infrastructure::youtube::YoutubeScriptHost;
use crate::ports::outbound::{PollHandle, PollTimer, TaskSpawner};
use crate::state::Platform;

/// `setInterval` wrapper. Dropping the handle clears the interval.
#[derive(Clone, Default)]
pub struct WasmPollTimer;

impl PollTimer for WasmPollTimer {
    fn start(&self, period_ms: u32, mut tick: Box<dyn FnMut()>) -> PollHandle {
        let interval = Interval::new(period_ms, move || tick());
        PollHandle::new(move || drop(interval))
    }
}

#[derive(Clone, Default)]
pub struct WasmTaskSpawner;

impl TaskSpawner for WasmTaskSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Create platform services for the browser
pub fn create_platform(config: &PlayerConfig) -> Platform {
    Platform::new(
        WasmPollTimer,
        WasmTaskSpawner,
        YoutubeScriptHost::new(config.api_probe_ms, config.api_probe_limit),
    )
}
