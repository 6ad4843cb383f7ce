//! Player Adapter - one live widget instance per mount.
//!
//! The adapter owns exactly one widget handle and at most one poll timer. It
//! turns the widget's native ready / state / error notifications into the
//! controller's vocabulary ([`PlaybackStatus`] plus time updates) and never
//! trusts the widget's callback order:
//!
//! - state changes that arrive before `ready` are held back (latest wins) and
//!   replayed right after it
//! - `ready` always performs an explicit seek to the initial position and then
//!   applies the latest requested play state
//! - once destroyed, nothing reaches the registered callbacks again
//!
//! Widget calls are never made while the adapter's own state is borrowed, so a
//! widget that reports synchronously cannot re-enter a live borrow.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use waymark_domain::{PlaybackPosition, VideoId, WidgetPlayerState};

use crate::application::error::PlaybackError;
use crate::application::widget_loader::{LoadResult, WidgetLoader};
use crate::ports::outbound::{
    PollHandle, PollTimer, TaskSpawner, VideoWidget, WidgetEvent, WidgetEventSink, WidgetParams,
};
use crate::state::Platform;

/// Default interval between position reads while playing.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 500;

static NEXT_ADAPTER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdapterId(u64);

impl AdapterId {
    fn next() -> Self {
        Self(NEXT_ADAPTER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adapter-{}", self.0)
    }
}

/// Lifecycle of a single adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterPhase {
    /// Waiting for the widget script.
    Loading,
    /// Inside the widget constructor.
    Constructing,
    /// Constructed, waiting for the widget's ready notification.
    AwaitingReady,
    Ready,
    Playing,
    Paused,
    Buffering,
    Ended,
    Failed,
    Destroyed,
}

impl AdapterPhase {
    fn accepts_commands(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Playing | Self::Paused | Self::Buffering | Self::Ended
        )
    }

    fn before_ready(self) -> bool {
        matches!(self, Self::Loading | Self::Constructing | Self::AwaitingReady)
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Destroyed)
    }
}

/// State changes reported upward by an adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Ended,
    Buffering,
    Error(PlaybackError),
}

/// Widget options that do not change per mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterOptions {
    pub poll_interval_ms: u32,
    pub controls: bool,
    pub plays_inline: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            controls: true,
            plays_inline: true,
        }
    }
}

/// Everything an adapter needs from the outside world.
#[derive(Clone)]
pub struct AdapterDeps {
    loader: WidgetLoader,
    timer: Rc<dyn PollTimer>,
    spawner: Rc<dyn TaskSpawner>,
    options: AdapterOptions,
}

impl AdapterDeps {
    pub fn new(platform: &Platform, loader: WidgetLoader, options: AdapterOptions) -> Self {
        Self {
            loader,
            timer: platform.timer(),
            spawner: platform.spawner(),
            options,
        }
    }
}

/// Per-mount construction request.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterRequest {
    pub target_id: String,
    pub video_id: VideoId,
    pub initial_time: PlaybackPosition,
    pub initial_playing: bool,
    /// Ask the widget to start on its own (best-effort; browsers may refuse).
    pub autoplay: bool,
}

type ReadyCallback = Rc<dyn Fn()>;
type StateCallback = Rc<dyn Fn(PlaybackStatus)>;
type TimeCallback = Rc<dyn Fn(PlaybackPosition)>;

struct AdapterInner {
    id: AdapterId,
    phase: AdapterPhase,
    request: AdapterRequest,
    options: AdapterOptions,
    desired_playing: bool,
    widget: Option<Rc<dyn VideoWidget>>,
    poll: Option<PollHandle>,
    last_polled: PlaybackPosition,
    ready_pending: bool,
    queued_state: Option<WidgetPlayerState>,
    timer: Rc<dyn PollTimer>,
    on_ready: Option<ReadyCallback>,
    on_state_change: Option<StateCallback>,
    on_time_update: Option<TimeCallback>,
}

impl AdapterInner {
    fn widget_params(&self) -> WidgetParams {
        WidgetParams {
            target_id: self.request.target_id.clone(),
            video_id: self.request.video_id.clone(),
            plays_inline: self.options.plays_inline,
            autoplay: self.request.autoplay,
            controls: self.options.controls,
            start: self.request.initial_time,
        }
    }

    fn clear_callbacks(&mut self) {
        self.on_ready = None;
        self.on_state_change = None;
        self.on_time_update = None;
    }
}

impl Drop for AdapterInner {
    fn drop(&mut self) {
        // Dropped without an explicit destroy(): still release the widget.
        if let Some(widget) = self.widget.take() {
            widget.destroy();
        }
    }
}

/// Owning handle to one adapter. Held by the mount site that created it.
pub struct PlayerAdapter {
    inner: Rc<RefCell<AdapterInner>>,
}

/// Non-owning handle, held by the playback session.
#[derive(Clone)]
pub struct WeakAdapter {
    id: AdapterId,
    inner: Weak<RefCell<AdapterInner>>,
}

impl WeakAdapter {
    pub fn id(&self) -> AdapterId {
        self.id
    }

    pub fn upgrade(&self) -> Option<PlayerAdapter> {
        self.inner.upgrade().map(|inner| PlayerAdapter { inner })
    }
}

impl fmt::Debug for WeakAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakAdapter").field("id", &self.id).finish()
    }
}

impl PlayerAdapter {
    /// Start loading the widget and return immediately.
    ///
    /// The widget is constructed once the loader resolves; completion is
    /// reported through [`on_ready`](Self::on_ready) or, on failure, through
    /// [`on_state_change`](Self::on_state_change) with [`PlaybackStatus::Error`].
    pub fn create(deps: &AdapterDeps, request: AdapterRequest) -> PlayerAdapter {
        let id = AdapterId::next();
        tracing::debug!(
            adapter_id = %id,
            video_id = %request.video_id,
            target = %request.target_id,
            start = request.initial_time.seconds(),
            playing = request.initial_playing,
            "Creating player adapter"
        );

        let inner = AdapterInner {
            id,
            phase: AdapterPhase::Loading,
            desired_playing: request.initial_playing,
            last_polled: request.initial_time,
            request,
            options: deps.options,
            widget: None,
            poll: None,
            ready_pending: false,
            queued_state: None,
            timer: Rc::clone(&deps.timer),
            on_ready: None,
            on_state_change: None,
            on_time_update: None,
        };
        let adapter = PlayerAdapter {
            inner: Rc::new(RefCell::new(inner)),
        };

        let weak = Rc::downgrade(&adapter.inner);
        let load = deps.loader.ensure_loaded();
        deps.spawner.spawn(
            async move {
                let result = load.await;
                Self::finish_loading(&weak, result);
            }
            .boxed_local(),
        );

        adapter
    }

    pub fn id(&self) -> AdapterId {
        self.inner.borrow().id
    }

    pub fn phase(&self) -> AdapterPhase {
        self.inner.borrow().phase
    }

    pub fn is_destroyed(&self) -> bool {
        self.phase() == AdapterPhase::Destroyed
    }

    pub fn has_active_poll(&self) -> bool {
        self.inner.borrow().poll.is_some()
    }

    pub fn downgrade(&self) -> WeakAdapter {
        WeakAdapter {
            id: self.id(),
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Fires once, after the widget confirms construction and the initial
    /// seek and play state were applied.
    pub fn on_ready(&self, callback: impl Fn() + 'static) {
        self.inner.borrow_mut().on_ready = Some(Rc::new(callback));
    }

    pub fn on_state_change(&self, callback: impl Fn(PlaybackStatus) + 'static) {
        self.inner.borrow_mut().on_state_change = Some(Rc::new(callback));
    }

    /// Polled positions while playing, every `poll_interval_ms`.
    pub fn on_time_update(&self, callback: impl Fn(PlaybackPosition) + 'static) {
        self.inner.borrow_mut().on_time_update = Some(Rc::new(callback));
    }

    /// Request play or pause. Before ready the latest request is buffered.
    pub fn set_playing(&self, playing: bool) {
        let widget = {
            let mut inner = self.inner.borrow_mut();
            inner.desired_playing = playing;
            let already = matches!(
                (inner.phase, playing),
                (AdapterPhase::Playing, true) | (AdapterPhase::Paused, false)
            );
            if already || !inner.phase.accepts_commands() {
                None
            } else {
                inner.widget.clone()
            }
        };

        if let Some(widget) = widget {
            if playing {
                widget.play();
            } else {
                widget.pause();
            }
        }
    }

    /// Best-effort synchronous position read.
    ///
    /// Falls back to the last polled value (initially the requested start)
    /// when the widget is not ready or cannot answer.
    pub fn read_current_time(&self) -> PlaybackPosition {
        let (widget, last) = {
            let inner = self.inner.borrow();
            let widget = if inner.phase.accepts_commands() {
                inner.widget.clone()
            } else {
                None
            };
            (widget, inner.last_polled)
        };

        widget
            .and_then(|w| w.current_time())
            .map(PlaybackPosition::new)
            .unwrap_or(last)
    }

    /// Stop polling and release the widget. Safe to call repeatedly and
    /// before the widget ever became ready.
    pub fn destroy(&self) {
        let (widget, poll, id) = {
            let mut inner = self.inner.borrow_mut();
            if inner.phase == AdapterPhase::Destroyed {
                return;
            }
            inner.phase = AdapterPhase::Destroyed;
            inner.clear_callbacks();
            inner.queued_state = None;
            (inner.widget.take(), inner.poll.take(), inner.id)
        };

        drop(poll);
        if let Some(widget) = widget {
            widget.destroy();
        }
        tracing::debug!(adapter_id = %id, "Player adapter destroyed");
    }

    // -------------------------------------------------------------------------
    // Widget lifecycle
    // -------------------------------------------------------------------------

    fn finish_loading(weak: &Weak<RefCell<AdapterInner>>, result: LoadResult) {
        let Some(rc) = weak.upgrade() else {
            return;
        };

        let factory = {
            let mut inner = rc.borrow_mut();
            if inner.phase != AdapterPhase::Loading {
                tracing::debug!(adapter_id = %inner.id, "Widget API resolved after adapter teardown");
                return;
            }
            match result {
                Ok(factory) => {
                    inner.phase = AdapterPhase::Constructing;
                    factory
                }
                Err(e) => {
                    drop(inner);
                    Self::fail(&rc, PlaybackError::WidgetLoad(e));
                    return;
                }
            }
        };

        let params = rc.borrow().widget_params();
        let sink: WidgetEventSink = {
            let weak = weak.clone();
            Rc::new(move |event| Self::dispatch(&weak, event))
        };

        match factory.construct(params, sink) {
            Ok(widget) => {
                let widget: Rc<dyn VideoWidget> = Rc::from(widget);
                let ready_now = {
                    let mut inner = rc.borrow_mut();
                    if inner.phase != AdapterPhase::Constructing {
                        // Torn down from inside the constructor.
                        None
                    } else {
                        inner.widget = Some(Rc::clone(&widget));
                        inner.phase = AdapterPhase::AwaitingReady;
                        Some(std::mem::take(&mut inner.ready_pending))
                    }
                };
                match ready_now {
                    None => widget.destroy(),
                    Some(true) => Self::handle_ready(&rc),
                    Some(false) => {}
                }
            }
            Err(e) => Self::fail(&rc, PlaybackError::Construction(e)),
        }
    }

    fn dispatch(weak: &Weak<RefCell<AdapterInner>>, event: WidgetEvent) {
        let Some(rc) = weak.upgrade() else {
            return;
        };
        match event {
            WidgetEvent::Ready => Self::handle_ready(&rc),
            WidgetEvent::StateChanged(state) => Self::handle_state(&rc, state),
            WidgetEvent::Error(code) => Self::fail(&rc, PlaybackError::Widget(code)),
        }
    }

    fn handle_ready(rc: &Rc<RefCell<AdapterInner>>) {
        let (widget, start, playing, id) = {
            let mut inner = rc.borrow_mut();
            match inner.phase {
                AdapterPhase::Constructing => {
                    inner.ready_pending = true;
                    return;
                }
                AdapterPhase::AwaitingReady => {}
                other => {
                    tracing::debug!(adapter_id = %inner.id, phase = ?other, "Ignoring late ready notification");
                    return;
                }
            }
            inner.phase = AdapterPhase::Ready;
            (
                inner.widget.clone(),
                inner.request.initial_time,
                inner.desired_playing,
                inner.id,
            )
        };

        tracing::debug!(
            adapter_id = %id,
            start = start.seconds(),
            playing,
            "Widget ready, restoring position"
        );

        if let Some(widget) = widget {
            widget.seek_to(start.seconds(), true);
            if playing {
                widget.play();
            } else {
                widget.pause();
            }
        }

        // The callback may have destroyed us; re-check before replaying.
        let on_ready = rc.borrow().on_ready.clone();
        if let Some(callback) = on_ready {
            callback();
        }

        let queued = {
            let mut inner = rc.borrow_mut();
            if inner.phase.is_terminal() {
                None
            } else {
                inner.queued_state.take()
            }
        };
        if let Some(state) = queued {
            Self::handle_state(rc, state);
        }
    }

    fn handle_state(rc: &Rc<RefCell<AdapterInner>>, state: WidgetPlayerState) {
        let (previous_poll, callback, start_poll, status) = {
            let mut inner = rc.borrow_mut();
            if inner.phase.before_ready() {
                tracing::debug!(adapter_id = %inner.id, ?state, "Queueing state change until ready");
                inner.queued_state = Some(state);
                return;
            }
            if inner.phase.is_terminal() {
                return;
            }

            let (phase, status) = match state {
                WidgetPlayerState::Playing => (AdapterPhase::Playing, PlaybackStatus::Playing),
                WidgetPlayerState::Paused => (AdapterPhase::Paused, PlaybackStatus::Paused),
                WidgetPlayerState::Buffering => {
                    (AdapterPhase::Buffering, PlaybackStatus::Buffering)
                }
                WidgetPlayerState::Ended => (AdapterPhase::Ended, PlaybackStatus::Ended),
                WidgetPlayerState::Unstarted | WidgetPlayerState::Cued => {
                    tracing::trace!(adapter_id = %inner.id, ?state, "Widget state not reported upward");
                    return;
                }
            };
            inner.phase = phase;

            // Any transition stops the current poll; entering playing starts a new one.
            (
                inner.poll.take(),
                inner.on_state_change.clone(),
                state.is_playing(),
                status,
            )
        };
        drop(previous_poll);

        if start_poll {
            Self::start_poll(rc);
        }

        if let Some(callback) = callback {
            callback(status);
        }
    }

    fn start_poll(rc: &Rc<RefCell<AdapterInner>>) {
        let (timer, period) = {
            let inner = rc.borrow();
            (Rc::clone(&inner.timer), inner.options.poll_interval_ms)
        };

        let weak = Rc::downgrade(rc);
        let handle = timer.start(period, Box::new(move || Self::poll_tick(&weak)));

        let stale = {
            let mut inner = rc.borrow_mut();
            if inner.phase == AdapterPhase::Playing {
                inner.poll.replace(handle)
            } else {
                Some(handle)
            }
        };
        drop(stale);
    }

    fn poll_tick(weak: &Weak<RefCell<AdapterInner>>) {
        let Some(rc) = weak.upgrade() else {
            return;
        };
        let widget = {
            let inner = rc.borrow();
            if inner.phase != AdapterPhase::Playing {
                return;
            }
            inner.widget.clone()
        };
        let Some(seconds) = widget.and_then(|w| w.current_time()) else {
            return;
        };

        let position = PlaybackPosition::new(seconds);
        let callback = {
            let mut inner = rc.borrow_mut();
            if inner.phase != AdapterPhase::Playing {
                return;
            }
            inner.last_polled = position;
            inner.on_time_update.clone()
        };
        if let Some(callback) = callback {
            callback(position);
        }
    }

    fn fail(rc: &Rc<RefCell<AdapterInner>>, error: PlaybackError) {
        let (poll, callback, id) = {
            let mut inner = rc.borrow_mut();
            if inner.phase.is_terminal() {
                return;
            }
            inner.phase = AdapterPhase::Failed;
            inner.queued_state = None;
            (inner.poll.take(), inner.on_state_change.clone(), inner.id)
        };
        drop(poll);

        tracing::warn!(adapter_id = %id, error = %error, "Player adapter failed");
        if let Some(callback) = callback {
            callback(PlaybackStatus::Error(error));
        }
    }
}

impl fmt::Debug for PlayerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("PlayerAdapter")
            .field("id", &inner.id)
            .field("phase", &inner.phase)
            .field("video_id", &inner.request.video_id)
            .finish()
    }
}
