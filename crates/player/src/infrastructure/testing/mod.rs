//! Test doubles for the platform and widget ports.
//!
//! Everything here is deterministic and single-threaded: timers tick, tasks
//! run and scripts load only when a test asks. Available to unit tests and,
//! through the `testing` feature, to downstream crates.

mod platform_fakes;
mod widget_fakes;

use std::rc::Rc;

pub use platform_fakes::{ManualPollTimer, ManualScriptHost, ManualSpawner};
pub use widget_fakes::{RecordingWidget, ScriptedWidgetFactory, WidgetCommand, WidgetProbe};

use crate::application::error::WidgetLoadError;
use crate::application::player_adapter::{AdapterDeps, AdapterOptions};
use crate::application::widget_loader::WidgetLoader;
use crate::state::Platform;

pub const TEST_SCRIPT_URL: &str = "https://widgets.test/iframe_api";

/// A platform wired to manual fakes, plus handles to drive them.
pub struct TestHarness {
    pub timer: Rc<ManualPollTimer>,
    pub spawner: Rc<ManualSpawner>,
    pub host: Rc<ManualScriptHost>,
    pub factory: Rc<ScriptedWidgetFactory>,
    pub platform: Platform,
    pub loader: WidgetLoader,
}

impl TestHarness {
    pub fn new() -> Self {
        let timer = Rc::new(ManualPollTimer::default());
        let spawner = Rc::new(ManualSpawner::default());
        let host = Rc::new(ManualScriptHost::default());
        let platform = Platform::from_shared(timer.clone(), spawner.clone(), host.clone());
        let loader = WidgetLoader::new(platform.script_host(), TEST_SCRIPT_URL);

        Self {
            timer,
            spawner,
            host,
            factory: Rc::new(ScriptedWidgetFactory::default()),
            platform,
            loader,
        }
    }

    pub fn deps(&self) -> AdapterDeps {
        AdapterDeps::new(&self.platform, self.loader.clone(), AdapterOptions::default())
    }

    /// Run spawned tasks (adapter construction after the API is loaded).
    pub fn run(&self) {
        self.spawner.run_until_idle();
    }

    /// Complete outstanding script loads with the scripted factory, then run.
    pub fn load_widget_api(&self) {
        self.host.resolve(self.factory.clone());
        self.run();
    }

    pub fn fail_widget_api(&self, error: WidgetLoadError) {
        self.host.fail(error);
        self.run();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
