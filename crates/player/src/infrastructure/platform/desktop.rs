//! Desktop platform implementations
//!
//! Timers and tasks run on the Dioxus desktop executor (backed by tokio).
//! The webview cannot host the embeddable widget, so the script host reports
//! `Unsupported` and widget videos fall back to the unavailable notice.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use dioxus::core::spawn_forever;
use futures_util::future::{self, FutureExt, LocalBoxFuture};

use crate::application::error::WidgetLoadError;
use crate::application::widget_loader::LoadResult;
use crate::config::PlayerConfig;
use crate::ports::outbound::{PollHandle, PollTimer, TaskSpawner, WidgetScriptHost};
use crate::state::Platform;

/// Interval timer driven by `tokio::time::sleep`.
#[derive(Clone, Default)]
pub struct DesktopPollTimer;

impl PollTimer for DesktopPollTimer {
    fn start(&self, period_ms: u32, mut tick: Box<dyn FnMut()>) -> PollHandle {
        let stopped = Rc::new(Cell::new(false));
        let flag = Rc::clone(&stopped);
        let period = Duration::from_millis(u64::from(period_ms));

        let _ = spawn_forever(async move {
            loop {
                tokio::time::sleep(period).await;
                if flag.get() {
                    break;
                }
                tick();
            }
        });

        PollHandle::new(move || stopped.set(true))
    }
}

/// Spawns onto the Dioxus runtime so tasks outlive the calling component.
#[derive(Clone, Default)]
pub struct DesktopTaskSpawner;

impl TaskSpawner for DesktopTaskSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        let _ = spawn_forever(task);
    }
}

#[derive(Clone, Default)]
pub struct DesktopScriptHost;

impl WidgetScriptHost for DesktopScriptHost {
    fn load(&self, script_url: &str) -> LocalBoxFuture<'static, LoadResult> {
        tracing::info!(url = script_url, "Widget script requested on desktop; not supported");
        future::ready(Err(WidgetLoadError::Unsupported)).boxed_local()
    }
}

/// Create platform services for desktop
pub fn create_platform(_config: &PlayerConfig) -> Platform {
    Platform::new(DesktopPollTimer, DesktopTaskSpawner, DesktopScriptHost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_host_reports_unsupported() {
        let result = DesktopScriptHost
            .load("https://www.youtube.com/iframe_api")
            .await;
        assert!(matches!(result, Err(WidgetLoadError::Unsupported)));
    }
}
