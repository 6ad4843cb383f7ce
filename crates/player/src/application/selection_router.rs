//! Selection Router - scene selections to content and playback sessions.
//!
//! Every selection starts from scratch: the previous session is destroyed
//! and, when the new record has a widget video, a fresh session at zero,
//! paused, takes its place.

use std::cell::RefCell;
use std::rc::Rc;

use waymark_domain::{ContentCatalog, ContentRecord, EndedPolicy, LocationId};

use crate::application::error::UnresolvedSelectionWarning;
use crate::application::media_view::MediaView;
use crate::application::playback_session::PlaybackSession;
use crate::application::view_coordinator::ViewCoordinator;

/// What the side panel should show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanelState {
    #[default]
    Hidden,
    Showing {
        record: ContentRecord,
        media: MediaView,
    },
}

impl PanelState {
    pub fn record(&self) -> Option<&ContentRecord> {
        match self {
            Self::Hidden => None,
            Self::Showing { record, .. } => Some(record),
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Showing { .. })
    }
}

#[derive(Clone)]
pub struct SelectionRouter {
    catalog: Rc<ContentCatalog>,
    coordinator: ViewCoordinator,
    ended_policy: EndedPolicy,
    current: Rc<RefCell<Option<LocationId>>>,
}

impl SelectionRouter {
    pub fn new(
        catalog: Rc<ContentCatalog>,
        coordinator: ViewCoordinator,
        ended_policy: EndedPolicy,
    ) -> Self {
        Self {
            catalog,
            coordinator,
            ended_policy,
            current: Rc::new(RefCell::new(None)),
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn coordinator(&self) -> &ViewCoordinator {
        &self.coordinator
    }

    pub fn current(&self) -> Option<LocationId> {
        self.current.borrow().clone()
    }

    /// Handle a location selection from the scene.
    pub fn select(&self, location_id: &LocationId) -> PanelState {
        let Some(record) = self.catalog.get(location_id).cloned() else {
            let warning = UnresolvedSelectionWarning {
                location_id: location_id.clone(),
            };
            tracing::warn!(location_id = %location_id, "{warning}");
            self.clear();
            return PanelState::Hidden;
        };

        let media = MediaView::for_source(record.video_source.as_ref());
        let session = match &media {
            MediaView::Tracked { video_id } => {
                Some(PlaybackSession::new(video_id.clone(), self.ended_policy))
            }
            MediaView::Direct { .. } | MediaView::Absent => None,
        };

        tracing::info!(
            location_id = %location_id,
            title = %record.title,
            tracked = session.is_some(),
            "Location selected"
        );
        self.coordinator.replace_session(session);
        *self.current.borrow_mut() = Some(location_id.clone());

        PanelState::Showing { record, media }
    }

    /// Close the panel and end any playback.
    pub fn close(&self) -> PanelState {
        if let Some(location_id) = self.current() {
            tracing::debug!(location_id = %location_id, "Panel closed");
        }
        self.clear();
        PanelState::Hidden
    }

    fn clear(&self) {
        self.coordinator.replace_session(None);
        *self.current.borrow_mut() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::playback_session::SessionPhase;
    use crate::application::view_coordinator::{MountSite, TransitionPolicy};
    use crate::infrastructure::testing::TestHarness;
    use crate::ports::outbound::WidgetEvent;
    use waymark_domain::{PlaybackPosition, WidgetPlayerState};

    const CATALOG: &str = r#"{
        "harbour": {
            "id": "harbour",
            "title": "The Harbour",
            "mainVideoUrl": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "chapters": []
        },
        "lighthouse": {
            "id": "lighthouse",
            "title": "The Lighthouse",
            "mainVideoUrl": "https://youtu.be/aqz-KE-bpKQ",
            "chapters": []
        },
        "archive": {
            "id": "archive",
            "title": "Archive Footage",
            "mainVideoUrl": "https://cdn.test/archive.mp4",
            "chapters": []
        },
        "garden": {
            "id": "garden",
            "title": "The Garden",
            "mainVideoUrl": "",
            "chapters": []
        }
    }"#;

    fn router(harness: &TestHarness) -> SelectionRouter {
        let catalog = ContentCatalog::from_json(CATALOG).expect("catalog parses");
        let coordinator = ViewCoordinator::new(harness.deps(), TransitionPolicy::default());
        SelectionRouter::new(Rc::new(catalog), coordinator, EndedPolicy::default())
    }

    fn id(raw: &str) -> LocationId {
        LocationId::parse(raw).expect("valid location")
    }

    #[test]
    fn widget_video_creates_a_fresh_paused_session() {
        let harness = TestHarness::new();
        let router = router(&harness);

        let panel = router.select(&id("harbour"));
        assert!(panel.is_visible());
        let session = router.coordinator().session().expect("session created");
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert_eq!(session.current_time(), PlaybackPosition::ZERO);
        assert!(!session.is_playing());
        assert_eq!(router.current(), Some(id("harbour")));
    }

    #[test]
    fn new_selection_resets_continuity() {
        let harness = TestHarness::new();
        let router = router(&harness);
        router.select(&id("harbour"));
        let first = router.coordinator().session().expect("session");
        router
            .coordinator()
            .mount(MountSite::Inline, "inline")
            .expect("mount");
        harness.load_widget_api();
        harness.factory.emit(0, WidgetEvent::Ready);
        first.set_playing(true);
        harness
            .factory
            .emit(0, WidgetEvent::StateChanged(WidgetPlayerState::Playing));
        harness.factory.set_time(0, 90.0);
        harness.timer.fire();

        router.select(&id("lighthouse"));

        assert_eq!(first.phase(), SessionPhase::Destroyed);
        assert_eq!(harness.timer.active_count(), 0);
        let second = router.coordinator().session().expect("fresh session");
        assert!(!second.ptr_eq(&first));
        assert_eq!(second.current_time(), PlaybackPosition::ZERO);
        assert!(!second.is_playing());
    }

    #[test]
    fn reselecting_the_same_location_also_starts_over() {
        let harness = TestHarness::new();
        let router = router(&harness);
        router.select(&id("harbour"));
        let first = router.coordinator().session().expect("session");
        router.select(&id("harbour"));
        let second = router.coordinator().session().expect("session");
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn direct_files_and_missing_videos_get_no_session() {
        let harness = TestHarness::new();
        let router = router(&harness);
        router.select(&id("harbour"));

        let panel = router.select(&id("archive"));
        assert!(matches!(
            panel,
            PanelState::Showing {
                media: MediaView::Direct { .. },
                ..
            }
        ));
        assert!(router.coordinator().session().is_none());

        let panel = router.select(&id("garden"));
        assert!(matches!(
            panel,
            PanelState::Showing {
                media: MediaView::Absent,
                ..
            }
        ));
        assert!(router.coordinator().session().is_none());
    }

    #[test]
    fn unknown_location_clears_the_panel() {
        let harness = TestHarness::new();
        let router = router(&harness);
        router.select(&id("harbour"));
        let session = router.coordinator().session().expect("session");

        assert_eq!(router.select(&id("nowhere")), PanelState::Hidden);
        assert_eq!(session.phase(), SessionPhase::Destroyed);
        assert_eq!(router.current(), None);
    }

    #[test]
    fn close_destroys_the_active_session() {
        let harness = TestHarness::new();
        let router = router(&harness);
        router.select(&id("lighthouse"));
        let session = router.coordinator().session().expect("session");

        assert_eq!(router.close(), PanelState::Hidden);
        assert_eq!(session.phase(), SessionPhase::Destroyed);
        assert!(router.coordinator().session().is_none());
    }
}
