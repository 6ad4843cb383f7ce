//! Enlarged overlay - the focal mount site.

use dioxus::prelude::*;

use crate::application::view_coordinator::{MountSite, Presentation};

use super::services::ViewerServices;
use super::state::ViewerState;
use super::video::SessionVideo;

#[component]
pub fn EnlargedOverlay() -> Element {
    let services = use_context::<ViewerServices>();
    let state = use_context::<ViewerState>();

    if state.view.read().presentation != Presentation::Enlarged {
        return rsx! {};
    }

    let backdrop = services.coordinator.clone();
    let button = services.coordinator.clone();

    rsx! {
        div {
            class: "waymark-overlay",
            onclick: move |_| backdrop.shrink(),
            div {
                class: "waymark-overlay-frame",
                onclick: move |evt| evt.stop_propagation(),
                SessionVideo { site: MountSite::Overlay }
                button {
                    class: "waymark-shrink",
                    title: "Back to panel",
                    onclick: move |_| button.shrink(),
                    "×"
                }
            }
        }
    }
}
