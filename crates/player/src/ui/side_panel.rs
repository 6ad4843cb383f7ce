//! Side panel - content for the selected location, with the inline player.

use dioxus::prelude::*;
use waymark_domain::ContentRecord;

use crate::application::media_view::MediaView;
use crate::application::selection_router::PanelState;
use crate::application::view_coordinator::{MountSite, Presentation};

use super::content_blocks::ChapterView;
use super::services::ViewerServices;
use super::state::ViewerState;
use super::video::{DirectVideo, SessionVideo};

#[component]
pub fn SidePanel() -> Element {
    let services = use_context::<ViewerServices>();
    let mut state = use_context::<ViewerState>();

    let panel = state.panel.read().clone();
    let PanelState::Showing { record, media } = panel else {
        return rsx! {};
    };
    let presentation = state.view.read().presentation;
    let router = services.router.clone();

    rsx! {
        aside {
            class: "waymark-panel",
            button {
                class: "waymark-close",
                title: "Close",
                onclick: move |_| state.show(router.close()),
                "×"
            }
            PanelBody { record, media, presentation }
        }
    }
}

#[component]
fn PanelBody(record: ContentRecord, media: MediaView, presentation: Presentation) -> Element {
    rsx! {
        h2 { class: "waymark-title", "{record.title}" }
        if let Some(quote) = &record.highlight_quote {
            p { class: "waymark-highlight", "“{quote}”" }
        }
        MediaArea { media, presentation }
        for (index, chapter) in record.chapters.iter().enumerate() {
            ChapterView { key: "{index}", chapter: chapter.clone() }
        }
    }
}

#[component]
fn MediaArea(media: MediaView, presentation: Presentation) -> Element {
    let coordinator = use_context::<ViewerServices>().coordinator;

    match media {
        MediaView::Absent => rsx! {},
        MediaView::Direct { url, mime } => rsx! {
            div {
                class: "waymark-video-frame",
                DirectVideo { url, mime: mime.to_string() }
            }
        },
        MediaView::Tracked { .. } => rsx! {
            div {
                class: "waymark-video-frame",
                if presentation == Presentation::Inline {
                    SessionVideo { site: MountSite::Inline }
                    button {
                        class: "waymark-enlarge",
                        title: "Enlarge video",
                        onclick: move |_| coordinator.enlarge(),
                        "⤢"
                    }
                } else {
                    div { class: "waymark-video-placeholder", "Playing in the enlarged view" }
                }
            }
        },
    }
}
