//! Playback Session - the continuity unit for one logical video.
//!
//! A session outlives every mount. It records `{video, time, playing}` and
//! accepts exactly one bound [`PlayerAdapter`] at a time, through a weak
//! handle: the mount site owns the adapter, the session only listens to it.
//!
//! ```text
//! Empty/Detached --bind--> Bound --ready--> Ready <-> Playing <-> Paused --> Ended
//!        ^                   |                        |
//!        +------unbind-------+------------------------+
//! Bound/Ready/Playing/Paused --error--> Error         (any) --destroy--> Destroyed
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use waymark_domain::{EndedPolicy, PlaybackPosition, VideoId};

use crate::application::error::{PlaybackError, SessionError};
use crate::application::player_adapter::{AdapterId, PlaybackStatus, PlayerAdapter, WeakAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, never bound.
    Empty,
    /// An adapter is bound but has not reported ready.
    Bound,
    Ready,
    Playing,
    Paused,
    Ended,
    /// Previously bound; waiting for the next mount.
    Detached,
    Error,
    Destroyed,
}

impl SessionPhase {
    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Bound => "bound",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Detached => "detached",
            Self::Error => "errored",
            Self::Destroyed => "destroyed",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Destroyed)
    }

    /// Phases in which the bound adapter's clock is authoritative.
    fn tracks_adapter_time(self) -> bool {
        matches!(self, Self::Bound | Self::Ready | Self::Playing | Self::Paused)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Point-in-time copy of a session, handed to observers and the view.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub video_id: VideoId,
    pub phase: SessionPhase,
    pub current_time: PlaybackPosition,
    pub is_playing: bool,
    pub bound_adapter: Option<AdapterId>,
    pub error: Option<PlaybackError>,
}

impl SessionSnapshot {
    pub fn is_playable(&self) -> bool {
        !self.phase.is_terminal()
    }
}

type SessionObserver = Rc<dyn Fn(&SessionSnapshot)>;

struct SessionInner {
    video_id: VideoId,
    phase: SessionPhase,
    current_time: PlaybackPosition,
    is_playing: bool,
    adapter: Option<WeakAdapter>,
    ended_policy: EndedPolicy,
    error: Option<PlaybackError>,
    observers: Vec<SessionObserver>,
}

impl SessionInner {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            video_id: self.video_id.clone(),
            phase: self.phase,
            current_time: self.current_time,
            is_playing: self.is_playing,
            bound_adapter: self.adapter.as_ref().map(WeakAdapter::id),
            error: self.error.clone(),
        }
    }

    fn is_bound_to(&self, id: AdapterId) -> bool {
        self.adapter.as_ref().is_some_and(|a| a.id() == id)
    }
}

/// Shared handle to one playback session. Clones refer to the same session.
#[derive(Clone)]
pub struct PlaybackSession {
    inner: Rc<RefCell<SessionInner>>,
}

impl PlaybackSession {
    /// A fresh session starts at zero, paused.
    pub fn new(video_id: VideoId, ended_policy: EndedPolicy) -> Self {
        tracing::debug!(video_id = %video_id, ?ended_policy, "New playback session");
        Self {
            inner: Rc::new(RefCell::new(SessionInner {
                video_id,
                phase: SessionPhase::Empty,
                current_time: PlaybackPosition::ZERO,
                is_playing: false,
                adapter: None,
                ended_policy,
                error: None,
                observers: Vec::new(),
            })),
        }
    }

    /// A new session for the same video, starting from this one's held
    /// position and play state. Observers are not carried over.
    pub fn restart(&self) -> PlaybackSession {
        let inner = self.inner.borrow();
        tracing::debug!(
            video_id = %inner.video_id,
            from_phase = %inner.phase,
            "Restarting playback session"
        );
        Self {
            inner: Rc::new(RefCell::new(SessionInner {
                video_id: inner.video_id.clone(),
                phase: SessionPhase::Empty,
                current_time: inner.current_time,
                is_playing: inner.is_playing,
                adapter: None,
                ended_policy: inner.ended_policy,
                error: None,
                observers: Vec::new(),
            })),
        }
    }

    pub fn video_id(&self) -> VideoId {
        self.inner.borrow().video_id.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.borrow().phase
    }

    pub fn current_time(&self) -> PlaybackPosition {
        self.inner.borrow().current_time
    }

    pub fn is_playing(&self) -> bool {
        self.inner.borrow().is_playing
    }

    pub fn bound_adapter(&self) -> Option<AdapterId> {
        self.inner.borrow().adapter.as_ref().map(WeakAdapter::id)
    }

    pub fn error(&self) -> Option<PlaybackError> {
        self.inner.borrow().error.clone()
    }

    pub fn is_playable(&self) -> bool {
        !self.phase().is_terminal()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.borrow().snapshot()
    }

    pub fn ptr_eq(&self, other: &PlaybackSession) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register an observer for every state change. Dropped on destroy.
    pub fn observe(&self, observer: impl Fn(&SessionSnapshot) + 'static) {
        self.inner.borrow_mut().observers.push(Rc::new(observer));
    }

    /// Attach a freshly created adapter and start listening to it.
    pub fn bind(&self, adapter: &PlayerAdapter) -> Result<(), SessionError> {
        let incoming = adapter.id();
        {
            let mut inner = self.inner.borrow_mut();
            if inner.phase.is_terminal() {
                return Err(SessionError::NotBindable(inner.phase.name()));
            }
            if let Some(bound) = inner.adapter.as_ref() {
                let live = bound.upgrade().is_some_and(|a| !a.is_destroyed());
                if live {
                    return Err(SessionError::AdapterAlreadyBound {
                        bound: bound.id().get(),
                        incoming: incoming.get(),
                    });
                }
                tracing::debug!(adapter_id = %bound.id(), "Releasing stale adapter binding");
            }
            inner.adapter = Some(adapter.downgrade());
            inner.phase = SessionPhase::Bound;
        }

        let weak = Rc::downgrade(&self.inner);
        {
            let weak = weak.clone();
            adapter.on_ready(move || Self::with_live(&weak, |s| s.handle_ready(incoming)));
        }
        {
            let weak = weak.clone();
            adapter.on_state_change(move |status| {
                Self::with_live(&weak, |s| s.handle_status(incoming, status))
            });
        }
        adapter.on_time_update(move |position| {
            Self::with_live(&weak, |s| s.handle_time(incoming, position))
        });

        tracing::debug!(adapter_id = %incoming, video_id = %self.video_id(), "Adapter bound");
        self.notify();
        Ok(())
    }

    /// Detach `adapter_id`, destroy it, and keep its last known time.
    ///
    /// Returns the position the session holds afterwards, or `None` when the
    /// adapter was not the bound one.
    pub fn unbind(&self, adapter_id: AdapterId) -> Option<PlaybackPosition> {
        let (adapter, tracks_time) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.is_bound_to(adapter_id) {
                return None;
            }
            (inner.adapter.take(), inner.phase.tracks_adapter_time())
        };

        let adapter = adapter.and_then(|a| a.upgrade());
        let handback = match (&adapter, tracks_time) {
            (Some(adapter), true) => Some(adapter.read_current_time()),
            _ => None,
        };
        if let Some(adapter) = adapter {
            adapter.destroy();
        }

        let held = {
            let mut inner = self.inner.borrow_mut();
            if let Some(position) = handback {
                inner.current_time = position;
            }
            if !inner.phase.is_terminal() {
                inner.phase = SessionPhase::Detached;
            }
            inner.current_time
        };

        tracing::debug!(
            adapter_id = %adapter_id,
            held = held.seconds(),
            "Adapter unbound"
        );
        self.notify();
        Some(held)
    }

    /// User intent to play or pause. Forwarded to the bound adapter, if any.
    pub fn set_playing(&self, playing: bool) {
        let adapter = {
            let mut inner = self.inner.borrow_mut();
            if inner.phase.is_terminal() {
                return;
            }
            inner.is_playing = playing;
            inner.adapter.as_ref().and_then(WeakAdapter::upgrade)
        };
        if let Some(adapter) = adapter {
            adapter.set_playing(playing);
        }
        self.notify();
    }

    /// Terminal. Destroys the bound adapter and drops all observers.
    pub fn destroy(&self) {
        let adapter = {
            let mut inner = self.inner.borrow_mut();
            if inner.phase == SessionPhase::Destroyed {
                return;
            }
            inner.phase = SessionPhase::Destroyed;
            inner.is_playing = false;
            inner.adapter.take()
        };
        if let Some(adapter) = adapter.and_then(|a| a.upgrade()) {
            adapter.destroy();
        }

        tracing::debug!(video_id = %self.video_id(), "Playback session destroyed");
        self.notify();
        self.inner.borrow_mut().observers.clear();
    }

    // -------------------------------------------------------------------------
    // Adapter notifications
    // -------------------------------------------------------------------------

    fn with_live(weak: &Weak<RefCell<SessionInner>>, f: impl FnOnce(&PlaybackSession)) {
        if let Some(inner) = weak.upgrade() {
            f(&PlaybackSession { inner });
        }
    }

    fn handle_ready(&self, id: AdapterId) {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.is_bound_to(id) || inner.phase != SessionPhase::Bound {
                return;
            }
            inner.phase = SessionPhase::Ready;
        }
        self.notify();
    }

    fn handle_status(&self, id: AdapterId, status: PlaybackStatus) {
        let adapter = {
            let inner = self.inner.borrow();
            if !inner.is_bound_to(id) || inner.phase.is_terminal() {
                return;
            }
            inner.adapter.as_ref().and_then(WeakAdapter::upgrade)
        };

        match status {
            PlaybackStatus::Playing => {
                let mut inner = self.inner.borrow_mut();
                inner.phase = SessionPhase::Playing;
                inner.is_playing = true;
            }
            PlaybackStatus::Paused => {
                let position = adapter.as_ref().map(PlayerAdapter::read_current_time);
                let mut inner = self.inner.borrow_mut();
                inner.phase = SessionPhase::Paused;
                inner.is_playing = false;
                if let Some(position) = position {
                    inner.current_time = position;
                }
            }
            PlaybackStatus::Ended => {
                let position = adapter.as_ref().map(PlayerAdapter::read_current_time);
                let mut inner = self.inner.borrow_mut();
                inner.phase = SessionPhase::Ended;
                inner.is_playing = false;
                inner.current_time = match inner.ended_policy {
                    EndedPolicy::HoldPosition => position.unwrap_or(inner.current_time),
                    EndedPolicy::RewindToStart => PlaybackPosition::ZERO,
                };
            }
            PlaybackStatus::Buffering => return,
            PlaybackStatus::Error(error) => {
                tracing::warn!(adapter_id = %id, error = %error, "Playback session became unplayable");
                {
                    let mut inner = self.inner.borrow_mut();
                    inner.phase = SessionPhase::Error;
                    inner.is_playing = false;
                    inner.error = Some(error);
                    inner.adapter = None;
                }
                if let Some(adapter) = adapter {
                    adapter.destroy();
                }
            }
        }
        self.notify();
    }

    fn handle_time(&self, id: AdapterId, position: PlaybackPosition) {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.is_bound_to(id) || inner.phase != SessionPhase::Playing {
                return;
            }
            inner.current_time = position;
        }
        self.notify();
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

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlaybackSession")
            .field(&self.inner.borrow().snapshot())
            .finish()
    }
}
