//! Playback continuity controller.
//!
//! Leaves first: the widget loader, the per-mount player adapter, the
//! playback session, the view coordinator that owns the two mount sites, and
//! the selection router in front of it all.

pub mod error;
pub mod media_view;
pub mod playback_session;
pub mod player_adapter;
pub mod selection_router;
pub mod view_coordinator;
pub mod widget_loader;

pub use error::{
    AdapterConstructionError, MountError, PlaybackError, SessionError,
    UnresolvedSelectionWarning, WidgetLoadError,
};
pub use media_view::MediaView;
pub use playback_session::{PlaybackSession, SessionPhase, SessionSnapshot};
pub use player_adapter::{
    AdapterDeps, AdapterId, AdapterOptions, AdapterPhase, AdapterRequest, PlaybackStatus,
    PlayerAdapter,
};
pub use selection_router::{PanelState, SelectionRouter};
pub use view_coordinator::{
    MountSite, PlayIntent, Presentation, TransitionPolicy, ViewCoordinator, ViewSnapshot,
};
pub use widget_loader::WidgetLoader;
