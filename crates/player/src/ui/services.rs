//! Controller services shared with components through Dioxus context.

use std::rc::Rc;

use waymark_domain::ContentCatalog;

use crate::application::player_adapter::AdapterDeps;
use crate::application::selection_router::SelectionRouter;
use crate::application::view_coordinator::ViewCoordinator;
use crate::application::widget_loader::WidgetLoader;
use crate::config::PlayerConfig;
use crate::state::Platform;

#[derive(Clone)]
pub struct ViewerServices {
    pub router: SelectionRouter,
    pub coordinator: ViewCoordinator,
}

impl ViewerServices {
    /// Wire the controller for one viewer. The widget loader is shared by
    /// every viewer on the thread.
    pub fn new(config: &PlayerConfig, catalog: Rc<ContentCatalog>, platform: &Platform) -> Self {
        let loader = WidgetLoader::process_wide(|| {
            WidgetLoader::new(platform.script_host(), config.widget_script_url.clone())
        });
        Self::with_loader(config, catalog, platform, loader)
    }

    pub fn with_loader(
        config: &PlayerConfig,
        catalog: Rc<ContentCatalog>,
        platform: &Platform,
        loader: WidgetLoader,
    ) -> Self {
        let deps = AdapterDeps::new(platform, loader, config.adapter_options());
        let coordinator = ViewCoordinator::new(deps, config.transition);
        let router = SelectionRouter::new(catalog, coordinator.clone(), config.ended_policy);
        Self {
            router,
            coordinator,
        }
    }
}

impl PartialEq for ViewerServices {
    fn eq(&self, _other: &Self) -> bool {
        // One instance per app; props never need to diff it.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::view_coordinator::MountSite;
    use crate::infrastructure::testing::TestHarness;
    use crate::ports::outbound::WidgetEvent;
    use waymark_domain::{ContentRecord, LocationId};

    #[test]
    fn configured_poll_interval_reaches_the_adapters() {
        let harness = TestHarness::new();
        let config = PlayerConfig {
            poll_interval_ms: 250,
            ..PlayerConfig::default()
        };
        let id = LocationId::parse("quay").expect("valid id");
        let record = ContentRecord::new(id.clone(), "The Quay")
            .with_video("https://www.youtube.com/embed/dQw4w9WgXcQ");
        let catalog = ContentCatalog::from_records([(id.clone(), record)]).expect("catalog");

        let services = ViewerServices::with_loader(
            &config,
            Rc::new(catalog),
            &harness.platform,
            harness.loader.clone(),
        );
        services.router.select(&id);
        services
            .coordinator
            .mount(MountSite::Inline, "target")
            .expect("mount");
        harness.load_widget_api();
        harness.factory.emit(0, WidgetEvent::Ready);
        services
            .coordinator
            .session()
            .expect("session")
            .set_playing(true);
        harness.factory.emit(
            0,
            WidgetEvent::StateChanged(waymark_domain::WidgetPlayerState::Playing),
        );

        assert_eq!(harness.timer.last_period(), Some(250));
    }
}
