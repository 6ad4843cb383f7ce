//! View Coordinator - the inline and overlay mount sites.
//!
//! Both sites present the same [`PlaybackSession`]. At most one of them hosts
//! an adapter at any instant, and the outgoing adapter is always unbound and
//! destroyed before the incoming one is created, so the session's time and
//! play state are handed over rather than raced.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::application::error::MountError;
use crate::application::playback_session::{PlaybackSession, SessionSnapshot};
use crate::application::player_adapter::{AdapterDeps, AdapterId, AdapterRequest, PlayerAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MountSite {
    /// The player inside the side panel.
    Inline,
    /// The enlarged focal overlay.
    Overlay,
}

impl MountSite {
    pub fn name(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Overlay => "overlay",
        }
    }

    fn other(self) -> Self {
        match self {
            Self::Inline => Self::Overlay,
            Self::Overlay => Self::Inline,
        }
    }
}

impl fmt::Display for MountSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which site is supposed to be showing the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presentation {
    #[default]
    Inline,
    Enlarged,
}

impl Presentation {
    pub fn active_site(self) -> MountSite {
        match self {
            Self::Inline => MountSite::Inline,
            Self::Enlarged => MountSite::Overlay,
        }
    }
}

/// What a presentation change asks of the session's play state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIntent {
    Play,
    Pause,
    Keep,
}

impl PlayIntent {
    fn apply(self, session: &PlaybackSession) {
        match self {
            Self::Play => session.set_playing(true),
            Self::Pause => session.set_playing(false),
            Self::Keep => {}
        }
    }
}

impl FromStr for PlayIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "keep" => Ok(Self::Keep),
            other => Err(format!("unknown play intent '{other}' (expected play, pause or keep)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPolicy {
    pub on_enlarge: PlayIntent,
    pub on_shrink: PlayIntent,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            on_enlarge: PlayIntent::Play,
            on_shrink: PlayIntent::Pause,
        }
    }
}

/// Everything the view needs to render the media area.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub presentation: Presentation,
    /// Bumped whenever a different session takes over. Views key their
    /// render targets on it so a new session always gets a fresh mount.
    pub generation: u64,
    pub session: Option<SessionSnapshot>,
    pub mounted: Option<(MountSite, AdapterId)>,
}

struct Mounted {
    target_id: String,
    adapter: PlayerAdapter,
}

type ViewObserver = Rc<dyn Fn(&ViewSnapshot)>;

struct CoordinatorInner {
    deps: AdapterDeps,
    policy: TransitionPolicy,
    session: Option<PlaybackSession>,
    generation: u64,
    presentation: Presentation,
    inline: Option<Mounted>,
    overlay: Option<Mounted>,
    observers: Vec<ViewObserver>,
}

impl CoordinatorInner {
    fn slot(&self, site: MountSite) -> &Option<Mounted> {
        match site {
            MountSite::Inline => &self.inline,
            MountSite::Overlay => &self.overlay,
        }
    }

    fn slot_mut(&mut self, site: MountSite) -> &mut Option<Mounted> {
        match site {
            MountSite::Inline => &mut self.inline,
            MountSite::Overlay => &mut self.overlay,
        }
    }

    fn snapshot(&self) -> ViewSnapshot {
        let mounted = [MountSite::Inline, MountSite::Overlay]
            .into_iter()
            .find_map(|site| self.slot(site).as_ref().map(|m| (site, m.adapter.id())));
        ViewSnapshot {
            presentation: self.presentation,
            generation: self.generation,
            session: self.session.as_ref().map(PlaybackSession::snapshot),
            mounted,
        }
    }
}

/// Shared handle; clones coordinate the same pair of mount sites.
#[derive(Clone)]
pub struct ViewCoordinator {
    inner: Rc<RefCell<CoordinatorInner>>,
}

impl ViewCoordinator {
    pub fn new(deps: AdapterDeps, policy: TransitionPolicy) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CoordinatorInner {
                deps,
                policy,
                session: None,
                generation: 0,
                presentation: Presentation::Inline,
                inline: None,
                overlay: None,
                observers: Vec::new(),
            })),
        }
    }

    pub fn session(&self) -> Option<PlaybackSession> {
        self.inner.borrow().session.clone()
    }

    pub fn presentation(&self) -> Presentation {
        self.inner.borrow().presentation
    }

    pub fn is_mounted(&self, site: MountSite) -> bool {
        self.inner.borrow().slot(site).is_some()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.borrow().snapshot()
    }

    pub fn observe(&self, observer: impl Fn(&ViewSnapshot) + 'static) {
        self.inner.borrow_mut().observers.push(Rc::new(observer));
    }

    /// Swap the active session. Both sites are unmounted and the previous
    /// session is destroyed; the presentation returns to inline.
    pub fn replace_session(&self, session: Option<PlaybackSession>) {
        let (previous, mounts) = {
            let mut inner = self.inner.borrow_mut();
            let mounts = [inner.inline.take(), inner.overlay.take()];
            inner.presentation = Presentation::Inline;
            inner.generation += 1;
            let previous = std::mem::replace(&mut inner.session, session.clone());
            (previous, mounts)
        };

        for mounted in mounts.into_iter().flatten() {
            if let Some(previous) = &previous {
                previous.unbind(mounted.adapter.id());
            }
            mounted.adapter.destroy();
        }
        if let Some(previous) = previous {
            previous.destroy();
        }

        if let Some(session) = session {
            self.follow(&session);
        }
        self.notify();
    }

    fn follow(&self, session: &PlaybackSession) {
        let weak = Rc::downgrade(&self.inner);
        session.observe(move |_| {
            if let Some(inner) = weak.upgrade() {
                ViewCoordinator { inner }.notify();
            }
        });
    }

    /// Swap an errored session for a fresh one on the same video, so the next
    /// mount makes a new load attempt from the held position.
    fn restart_errored(&self, session: PlaybackSession) -> PlaybackSession {
        let Some(error) = session.error() else {
            return session;
        };
        let fresh = session.restart();
        {
            let mut inner = self.inner.borrow_mut();
            inner.session = Some(fresh.clone());
            inner.generation += 1;
        }
        session.destroy();
        self.follow(&fresh);

        tracing::info!(
            video_id = %fresh.video_id(),
            previous_error = %error,
            resume_at = fresh.current_time().seconds(),
            "Retrying unplayable session"
        );
        fresh
    }

    /// Create an adapter for `site`, rendering into `target_id`.
    ///
    /// Mounting the same target twice returns the existing adapter. Any adapter
    /// on the other site is torn down first.
    pub fn mount(
        &self,
        site: MountSite,
        target_id: impl Into<String>,
    ) -> Result<AdapterId, MountError> {
        let target_id = target_id.into();
        let (session, deps, existing) = {
            let inner = self.inner.borrow();
            let session = inner.session.clone().ok_or(MountError::NoSession)?;
            let active = inner.presentation.active_site();
            if active != site {
                return Err(MountError::InactiveSite {
                    requested: site.name(),
                    active: active.name(),
                });
            }
            let existing = inner
                .slot(site)
                .as_ref()
                .filter(|m| m.target_id == target_id)
                .map(|m| m.adapter.id());
            (session, inner.deps.clone(), existing)
        };

        if let Some(id) = existing {
            return Ok(id);
        }
        if let Some(error) = session.error() {
            return Err(MountError::Unplayable(error));
        }
        if !session.is_playable() {
            return Err(MountError::NoSession);
        }

        self.release(site.other(), None);
        self.release(site, None);

        let snapshot = session.snapshot();
        let adapter = PlayerAdapter::create(
            &deps,
            AdapterRequest {
                target_id: target_id.clone(),
                video_id: snapshot.video_id.clone(),
                initial_time: snapshot.current_time,
                initial_playing: snapshot.is_playing,
                autoplay: site == MountSite::Overlay && snapshot.is_playing,
            },
        );
        if let Err(e) = session.bind(&adapter) {
            adapter.destroy();
            return Err(e.into());
        }

        let id = adapter.id();
        tracing::info!(
            site = %site,
            adapter_id = %id,
            video_id = %snapshot.video_id,
            start = snapshot.current_time.seconds(),
            playing = snapshot.is_playing,
            "Mounted player"
        );
        *self.inner.borrow_mut().slot_mut(site) = Some(Mounted { target_id, adapter });
        self.notify();
        Ok(id)
    }

    /// Tear down the adapter rendering into `target_id` on `site`.
    ///
    /// Idempotent. A stale unmount for a target that has since been replaced
    /// is ignored.
    pub fn unmount(&self, site: MountSite, target_id: &str) -> bool {
        let released = self.release(site, Some(target_id));
        if released {
            tracing::debug!(site = %site, target = target_id, "Unmounted player");
            self.notify();
        }
        released
    }

    /// Move the video into the overlay.
    pub fn enlarge(&self) {
        self.switch(Presentation::Enlarged);
    }

    /// Move the video back into the panel.
    pub fn shrink(&self) {
        self.switch(Presentation::Inline);
    }

    fn switch(&self, to: Presentation) {
        let (session, intent) = {
            let inner = self.inner.borrow();
            if inner.presentation == to {
                return;
            }
            let intent = match to {
                Presentation::Enlarged => inner.policy.on_enlarge,
                Presentation::Inline => inner.policy.on_shrink,
            };
            (inner.session.clone(), intent)
        };
        let Some(session) = session else {
            tracing::debug!(?to, "Ignoring presentation change without a session");
            return;
        };
        let session = self.restart_errored(session);

        let outgoing = to.active_site().other();
        self.release(outgoing, None);
        self.inner.borrow_mut().presentation = to;
        intent.apply(&session);

        tracing::info!(
            presentation = ?to,
            time = session.current_time().seconds(),
            playing = session.is_playing(),
            "Presentation changed"
        );
        self.notify();
    }

    fn release(&self, site: MountSite, only_target: Option<&str>) -> bool {
        let (mounted, session) = {
            let mut inner = self.inner.borrow_mut();
            let matches = match (inner.slot(site), only_target) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(m), Some(target)) => m.target_id == target,
            };
            if !matches {
                return false;
            }
            let mounted = inner.slot_mut(site).take();
            (mounted, inner.session.clone())
        };
        let Some(mounted) = mounted else {
            return false;
        };

        if let Some(session) = session {
            session.unbind(mounted.adapter.id());
        }
        mounted.adapter.destroy();
        true
    }

    fn notify(&self) {
        let (snapshot, observers) = {
            let inner = self.inner.borrow();
            (inner.snapshot(), inner.observers.clone())
        };
        for observer in observers {
            observer(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::{PlaybackError, WidgetLoadError};
    use crate::application::playback_session::SessionPhase;
    use crate::infrastructure::testing::{TestHarness, WidgetCommand, TEST_SCRIPT_URL};
    use crate::ports::outbound::{MockVideoWidget, WidgetEvent};
    use mockall::{predicate::eq, Sequence};
    use std::cell::Cell;
    use waymark_domain::{EndedPolicy, VideoId, WidgetPlayerState};

    fn coordinator_with_session(harness: &TestHarness) -> (ViewCoordinator, PlaybackSession) {
        let coordinator = ViewCoordinator::new(harness.deps(), TransitionPolicy::default());
        let session = PlaybackSession::new(
            VideoId::parse("M7lc1UVf-VE").expect("valid id"),
            EndedPolicy::default(),
        );
        coordinator.replace_session(Some(session.clone()));
        (coordinator, session)
    }

    /// Inline player playing at 42.3 seconds.
    fn playing_inline(harness: &TestHarness) -> (ViewCoordinator, PlaybackSession) {
        let (coordinator, session) = coordinator_with_session(harness);
        coordinator
            .mount(MountSite::Inline, "inline-a")
            .expect("inline mount");
        harness.load_widget_api();
        harness.factory.emit(0, WidgetEvent::Ready);
        session.set_playing(true);
        harness
            .factory
            .emit(0, WidgetEvent::StateChanged(WidgetPlayerState::Playing));
        harness.factory.set_time(0, 42.3);
        harness.timer.fire();
        assert_eq!(session.current_time().seconds(), 42.3);
        (coordinator, session)
    }

    #[test]
    fn enlarge_restores_position_and_play_state_on_the_overlay() {
        let harness = TestHarness::new();
        let (coordinator, session) = playing_inline(&harness);

        let mut seq = Sequence::new();
        let mut overlay = MockVideoWidget::new();
        overlay
            .expect_seek_to()
            .with(eq(42.3), eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        overlay
            .expect_play()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        overlay.expect_current_time().return_const(Some(42.3));
        overlay.expect_destroy().times(1).return_const(());
        harness.factory.push_widget(Box::new(overlay));

        coordinator.enlarge();
        assert_eq!(harness.factory.destroy_calls(0), 1);
        assert_eq!(harness.timer.active_count(), 0);
        assert!(!coordinator.is_mounted(MountSite::Inline));

        coordinator
            .mount(MountSite::Overlay, "overlay-a")
            .expect("overlay mount");
        harness.run();
        assert_eq!(harness.factory.constructed(), 2);
        let params = harness.factory.params(1);
        assert_eq!(params.start_seconds(), 42);
        assert!(params.autoplay);

        harness.factory.emit(1, WidgetEvent::Ready);
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert!(session.is_playing());

        coordinator.replace_session(None);
    }

    #[test]
    fn only_one_poller_runs_across_a_transition() {
        let harness = TestHarness::new();
        let (coordinator, _session) = playing_inline(&harness);
        assert_eq!(harness.timer.active_count(), 1);

        coordinator.enlarge();
        coordinator
            .mount(MountSite::Overlay, "overlay-b")
            .expect("overlay mount");
        harness.run();
        harness.factory.emit(1, WidgetEvent::Ready);
        harness
            .factory
            .emit(1, WidgetEvent::StateChanged(WidgetPlayerState::Playing));

        // A late state change from the destroyed inline widget must not start a poll.
        harness
            .factory
            .emit(0, WidgetEvent::StateChanged(WidgetPlayerState::Playing));

        assert_eq!(harness.timer.active_count(), 1);
        assert_eq!(harness.timer.started(), 2);
    }

    #[test]
    fn shrink_before_overlay_ready_leaves_no_callbacks() {
        let harness = TestHarness::new();
        let (coordinator, session) = playing_inline(&harness);
        coordinator.enlarge();
        coordinator
            .mount(MountSite::Overlay, "overlay-c")
            .expect("overlay mount");
        harness.run();

        let notifications = Rc::new(Cell::new(0));
        {
            let notifications = Rc::clone(&notifications);
            session.observe(move |_| notifications.set(notifications.get() + 1));
        }

        coordinator.shrink();
        assert_eq!(harness.factory.destroy_calls(1), 1);
        assert_eq!(session.current_time().seconds(), 42.3);
        assert!(!session.is_playing());
        let after_shrink = notifications.get();

        harness.factory.emit(1, WidgetEvent::Ready);
        harness
            .factory
            .emit(1, WidgetEvent::StateChanged(WidgetPlayerState::Playing));
        harness.timer.fire();

        assert_eq!(notifications.get(), after_shrink);
        assert_eq!(harness.factory.commands(1), vec![WidgetCommand::Destroy]);
        assert_eq!(harness.timer.active_count(), 0);
    }

    #[test]
    fn shrink_pauses_and_remounts_inline_at_the_held_time() {
        let harness = TestHarness::new();
        let (coordinator, session) = playing_inline(&harness);
        coordinator.enlarge();
        coordinator.mount(MountSite::Overlay, "overlay-d").expect("mount");
        harness.run();
        harness.factory.emit(1, WidgetEvent::Ready);
        harness.factory.set_time(1, 50.0);

        coordinator.shrink();
        assert_eq!(session.current_time().seconds(), 50.0);
        assert!(!session.is_playing());

        coordinator.mount(MountSite::Inline, "inline-b").expect("mount");
        harness.run();
        harness.factory.emit(2, WidgetEvent::Ready);
        assert_eq!(
            harness.factory.commands(2),
            vec![WidgetCommand::SeekTo(50.0, true), WidgetCommand::Pause]
        );
        assert!(!harness.factory.params(2).autoplay);
    }

    #[test]
    fn mounting_the_inactive_site_is_refused() {
        let harness = TestHarness::new();
        let (coordinator, _session) = coordinator_with_session(&harness);
        let err = coordinator
            .mount(MountSite::Overlay, "overlay")
            .expect_err("overlay is not active");
        assert_eq!(
            err,
            MountError::InactiveSite {
                requested: "overlay",
                active: "inline"
            }
        );
    }

    #[test]
    fn mounting_without_a_session_is_refused() {
        let harness = TestHarness::new();
        let coordinator = ViewCoordinator::new(harness.deps(), TransitionPolicy::default());
        assert_eq!(
            coordinator.mount(MountSite::Inline, "inline"),
            Err(MountError::NoSession)
        );
    }

    #[test]
    fn unplayable_session_refuses_new_mounts_on_the_same_site() {
        let harness = TestHarness::new();
        let (coordinator, _session) = coordinator_with_session(&harness);
        coordinator.mount(MountSite::Inline, "inline").expect("mount");
        harness.fail_widget_api(WidgetLoadError::Unsupported);

        assert_eq!(
            coordinator.mount(MountSite::Inline, "inline-again"),
            Err(MountError::Unplayable(PlaybackError::WidgetLoad(
                WidgetLoadError::Unsupported
            )))
        );
        assert_eq!(harness.host.requests(), 1);
    }

    #[test]
    fn re_enlarge_after_a_load_failure_makes_a_new_attempt() {
        let harness = TestHarness::new();
        let (coordinator, failed) = coordinator_with_session(&harness);
        coordinator.mount(MountSite::Inline, "inline").expect("mount");
        harness.fail_widget_api(WidgetLoadError::script_failed(TEST_SCRIPT_URL, "offline"));
        assert_eq!(failed.phase(), SessionPhase::Error);
        let before = coordinator.snapshot().generation;

        coordinator.enlarge();
        let retry = coordinator.session().expect("session");
        assert!(!retry.ptr_eq(&failed));
        assert_eq!(failed.phase(), SessionPhase::Destroyed);
        assert_eq!(retry.error(), None);
        assert!(retry.is_playing());
        assert!(coordinator.snapshot().generation > before);

        coordinator
            .mount(MountSite::Overlay, "overlay")
            .expect("overlay mount");
        assert_eq!(harness.host.requests(), 2);

        harness.load_widget_api();
        harness.factory.emit(0, WidgetEvent::Ready);
        assert_eq!(retry.phase(), SessionPhase::Ready);
        assert_eq!(
            coordinator.snapshot().session.map(|s| s.phase),
            Some(SessionPhase::Ready)
        );
    }

    #[test]
    fn generation_changes_with_every_new_session() {
        let harness = TestHarness::new();
        let (coordinator, _first) = coordinator_with_session(&harness);
        let first = coordinator.snapshot().generation;

        coordinator.enlarge();
        coordinator.shrink();
        assert_eq!(coordinator.snapshot().generation, first);

        coordinator.replace_session(Some(PlaybackSession::new(
            VideoId::parse("aqz-KE-bpKQ").expect("valid id"),
            EndedPolicy::default(),
        )));
        assert_ne!(coordinator.snapshot().generation, first);
    }

    #[test]
    fn repeated_mount_of_the_same_target_is_a_no_op() {
        let harness = TestHarness::new();
        let (coordinator, _session) = coordinator_with_session(&harness);
        let first = coordinator.mount(MountSite::Inline, "inline").expect("mount");
        let again = coordinator.mount(MountSite::Inline, "inline").expect("mount");
        assert_eq!(first, again);
        harness.load_widget_api();
        assert_eq!(harness.factory.constructed(), 1);
    }

    #[test]
    fn stale_unmount_keeps_the_newer_adapter() {
        let harness = TestHarness::new();
        let (coordinator, session) = coordinator_with_session(&harness);
        coordinator.mount(MountSite::Inline, "old").expect("mount");
        let newer = coordinator.mount(MountSite::Inline, "new").expect("mount");

        assert!(!coordinator.unmount(MountSite::Inline, "old"));
        assert_eq!(session.bound_adapter(), Some(newer));

        assert!(coordinator.unmount(MountSite::Inline, "new"));
        assert!(!coordinator.unmount(MountSite::Inline, "new"));
        assert_eq!(session.phase(), SessionPhase::Detached);
    }

    #[test]
    fn replacing_the_session_tears_everything_down() {
        let harness = TestHarness::new();
        let (coordinator, old) = playing_inline(&harness);
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        {
            let snapshots = Rc::clone(&snapshots);
            coordinator.observe(move |s| snapshots.borrow_mut().push(s.clone()));
        }

        coordinator.replace_session(None);

        assert_eq!(old.phase(), SessionPhase::Destroyed);
        assert_eq!(harness.factory.destroy_calls(0), 1);
        assert_eq!(harness.timer.active_count(), 0);
        let last = snapshots.borrow().last().cloned().expect("notified");
        assert_eq!(last.session, None);
        assert_eq!(last.mounted, None);
        assert_eq!(last.presentation, Presentation::Inline);
    }

    #[test]
    fn transition_policy_can_keep_play_state() {
        let harness = TestHarness::new();
        let coordinator = ViewCoordinator::new(
            harness.deps(),
            TransitionPolicy {
                on_enlarge: PlayIntent::Keep,
                on_shrink: PlayIntent::Keep,
            },
        );
        let session = PlaybackSession::new(
            VideoId::parse("M7lc1UVf-VE").expect("valid id"),
            EndedPolicy::default(),
        );
        coordinator.replace_session(Some(session.clone()));
        coordinator.enlarge();
        assert!(!session.is_playing());
        assert_eq!(coordinator.presentation(), Presentation::Enlarged);
    }

    #[test]
    fn play_intent_parses_from_config_strings() {
        assert_eq!("Play".parse::<PlayIntent>(), Ok(PlayIntent::Play));
        assert_eq!(" pause ".parse::<PlayIntent>(), Ok(PlayIntent::Pause));
        assert!("rewind".parse::<PlayIntent>().is_err());
    }
}
