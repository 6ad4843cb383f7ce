//! Video views: the continuity-tracked widget view, the direct-file view and
//! the unavailable notice.

use dioxus::prelude::*;
use uuid::Uuid;

use crate::application::media_view::DIRECT_FILE_PRELOAD;
use crate::application::view_coordinator::MountSite;

use super::services::ViewerServices;
use super::state::ViewerState;

/// [`TrackedVideo`] keyed by the session it presents.
///
/// Keys are only diffed inside lists, so the target sits in a one-element
/// loop. A new session generation replaces the whole render target, so
/// `onmounted` fires again and the new session gets an adapter.
#[component]
pub fn SessionVideo(site: MountSite) -> Element {
    let state = use_context::<ViewerState>();
    let generation = state.view.read().generation;

    rsx! {
        for generation in std::iter::once(generation) {
            TrackedVideo { key: "{generation}", site }
        }
    }
}

/// Render target for one widget adapter.
///
/// Each instance gets its own element id. Mounting asks the coordinator for
/// an adapter on `site`; dropping the component unmounts it again.
#[component]
pub fn TrackedVideo(site: MountSite) -> Element {
    let services = use_context::<ViewerServices>();
    let state = use_context::<ViewerState>();
    let target_id = use_hook(|| format!("waymark-video-{}", Uuid::new_v4()));

    {
        let coordinator = services.coordinator.clone();
        let target_id = target_id.clone();
        use_drop(move || {
            coordinator.unmount(site, &target_id);
        });
    }

    let error = state
        .view
        .read()
        .session
        .as_ref()
        .and_then(|session| session.error.clone());
    if let Some(error) = error {
        return rsx! {
            UnavailableNotice { message: error.user_message() }
        };
    }

    let coordinator = services.coordinator.clone();
    let mount_target = target_id.clone();

    rsx! {
        div {
            id: "{target_id}",
            class: "waymark-video-target",
            onmounted: move |_| {
                if let Err(e) = coordinator.mount(site, mount_target.clone()) {
                    tracing::debug!(site = %site, error = %e, "Player mount skipped");
                }
            },
        }
    }
}

/// Native `<video>` element for non-widget sources. No continuity.
#[component]
pub fn DirectVideo(url: String, mime: String) -> Element {
    rsx! {
        video {
            class: "waymark-video-direct",
            controls: true,
            preload: DIRECT_FILE_PRELOAD,
            source { src: "{url}", r#type: "{mime}" }
            "Your browser does not support the video tag or this video format."
        }
    }
}

#[component]
pub fn UnavailableNotice(message: String) -> Element {
    rsx! {
        div {
            class: "waymark-video-unavailable",
            role: "status",
            "{message}"
        }
    }
}
