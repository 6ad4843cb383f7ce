extern crate self as waymark_domain;

pub mod catalog;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use catalog::ContentCatalog;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{Chapter, ContentBlock, ContentRecord};

pub use error::DomainError;

// Re-export ID types
pub use ids::{LocationId, VideoId};

// Re-export value objects
pub use value_objects::{
    extract_widget_video_id, EndedPolicy, PlaybackPosition, VideoSource, WidgetErrorCode,
    WidgetPlayerState, WIDGET_VIDEO_ID_LEN,
};
