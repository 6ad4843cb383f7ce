//! Scene markers
//!
//! Stands in for the 3D scene's picking overlay: one marker per catalog
//! location, each emitting a location selection when clicked.

use dioxus::prelude::*;
use waymark_domain::LocationId;

use super::services::ViewerServices;
use super::state::ViewerState;

#[component]
pub fn SceneMarkers() -> Element {
    let services = use_context::<ViewerServices>();
    let state = use_context::<ViewerState>();

    let selected = state.panel.read().record().map(|r| r.id.clone());
    let markers: Vec<(String, LocationId, String, bool, bool)> = services
        .router
        .catalog()
        .locations()
        .map(|record| {
            (
                record.id.to_string(),
                record.id.clone(),
                record.title.clone(),
                record.has_video(),
                selected.as_ref() == Some(&record.id),
            )
        })
        .collect();

    rsx! {
        nav {
            class: "waymark-scene",
            for (key, id, title, has_video, selected) in markers {
                Marker {
                    key: "{key}",
                    selected,
                    id,
                    title,
                    has_video,
                }
            }
        }
    }
}

#[component]
fn Marker(id: LocationId, title: String, has_video: bool, selected: bool) -> Element {
    let router = use_context::<ViewerServices>().router;
    let mut state = use_context::<ViewerState>();
    let class = if selected {
        "waymark-marker selected"
    } else {
        "waymark-marker"
    };

    rsx! {
        button {
            class,
            onclick: move |_| state.show(router.select(&id)),
            "{title}"
            if has_video {
                span { class: "waymark-marker-video", " ▶" }
            }
        }
    }
}
