//! Domain entities - Core business objects with identity

mod content_record;

pub use content_record::{Chapter, ContentBlock, ContentRecord};
