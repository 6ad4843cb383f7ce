//! Value objects - Immutable objects defined by their attributes

mod playback;
mod video_source;
mod widget_state;

// Position and end-of-video handling
pub use playback::{EndedPolicy, PlaybackPosition};

// Widget vs. direct-file classification
pub use video_source::{extract_widget_video_id, VideoSource, WIDGET_VIDEO_ID_LEN};

// Widget-native state and error codes
pub use widget_state::{WidgetErrorCode, WidgetPlayerState};
