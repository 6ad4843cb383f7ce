//! Platform DI Container
//!
//! This module provides the `Platform` struct - a dependency injection container
//! that aggregates the platform-specific services behind port traits.
//!
//! Usage:
//! - Created by `create_platform()` in infrastructure/platform/desktop.rs or wasm.rs
//! - Created by `infrastructure::testing::TestHarness` in unit tests
//! - Handed to the `WidgetLoader` and the `ViewCoordinator` by the UI root

use std::rc::Rc;

use crate::ports::outbound::{PollTimer, TaskSpawner, WidgetScriptHost};

/// Unified platform services container
///
/// Cheap to clone; every service is shared behind an `Rc` because the whole
/// controller lives on the UI thread.
#[derive(Clone)]
pub struct Platform {
    timer: Rc<dyn PollTimer>,
    spawner: Rc<dyn TaskSpawner>,
    script_host: Rc<dyn WidgetScriptHost>,
}

impl Platform {
    pub fn new(
        timer: impl PollTimer + 'static,
        spawner: impl TaskSpawner + 'static,
        script_host: impl WidgetScriptHost + 'static,
    ) -> Self {
        Self {
            timer: Rc::new(timer),
            spawner: Rc::new(spawner),
            script_host: Rc::new(script_host),
        }
    }

    /// Build from already-shared services (tests keep a handle to drive fakes).
    pub fn from_shared(
        timer: Rc<dyn PollTimer>,
        spawner: Rc<dyn TaskSpawner>,
        script_host: Rc<dyn WidgetScriptHost>,
    ) -> Self {
        Self {
            timer,
            spawner,
            script_host,
        }
    }

    pub fn timer(&self) -> Rc<dyn PollTimer> {
        Rc::clone(&self.timer)
    }

    pub fn spawner(&self) -> Rc<dyn TaskSpawner> {
        Rc::clone(&self.spawner)
    }

    pub fn script_host(&self) -> Rc<dyn WidgetScriptHost> {
        Rc::clone(&self.script_host)
    }
}
