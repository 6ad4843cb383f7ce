//! Platform abstraction ports for cross-platform compatibility
//!
//! These traits abstract platform-specific operations so that:
//! 1. Application code (loader, adapter, session) remains platform-agnostic
//! 2. Platform-specific code is isolated in infrastructure
//! 3. Code becomes easily testable with manual fakes
//!
//! NOTE: The `Platform` struct (DI container) that aggregates these traits
//! lives in `state/platform.rs`, not here.

use std::fmt;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;

use super::video_widget_port::WidgetFactory;
use crate::application::error::WidgetLoadError;

/// Scoped handle for a running interval. Dropping it stops the interval.
pub struct PollHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl PollHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Fixed-interval timer abstraction (setInterval / tokio sleep loop).
pub trait PollTimer {
    /// Call `tick` every `period_ms` until the returned handle is dropped.
    fn start(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> PollHandle;
}

/// Spawns `!Send` futures on the UI thread's executor.
pub trait TaskSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Fetches and initialises the third-party widget script.
///
/// Implementations do not de-duplicate; `WidgetLoader` guarantees a single
/// in-flight request.
pub trait WidgetScriptHost {
    fn load(
        &self,
        script_url: &str,
    ) -> LocalBoxFuture<'static, Result<Rc<dyn WidgetFactory>, WidgetLoadError>>;
}
