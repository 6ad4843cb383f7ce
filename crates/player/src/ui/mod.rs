use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use waymark_domain::ContentCatalog;

use crate::config::PlayerConfig;
use crate::infrastructure::platform::create_platform;

mod content_blocks;
mod overlay;
mod scene;
mod services;
mod side_panel;
mod state;
mod video;

pub use services::ViewerServices;
pub use state::ViewerState;

const VIEWER_CSS: &str = include_str!("../../assets/viewer.css");

pub fn app() -> Element {
    rsx! {
        AppRoot {}
    }
}

#[component]
fn AppRoot() -> Element {
    // Provided by the composition root (see `crates/player/src/main.rs`).
    let config = use_context::<PlayerConfig>();
    let catalog = use_context::<Arc<ContentCatalog>>();

    // These must be created inside an active Dioxus runtime.
    let services = use_context_provider(|| {
        let platform = create_platform(&config);
        ViewerServices::new(&config, Rc::new(ContentCatalog::clone(&catalog)), &platform)
    });
    use_context_provider(|| ViewerState::new(&services.coordinator));

    {
        let router = services.router.clone();
        use_drop(move || {
            router.close();
        });
    }

    rsx! {
        style { {VIEWER_CSS} }
        div {
            class: "waymark-shell",
            scene::SceneMarkers {}
            side_panel::SidePanel {}
            overlay::EnlargedOverlay {}
        }
    }
}
