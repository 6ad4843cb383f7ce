//! Waymark Player crate.
//!
//! Scene media viewer built around the playback continuity controller: one
//! logical video session that survives its player being destroyed and
//! recreated as the view moves between the side panel and the enlarged
//! overlay. This crate contains UI, application logic, and infrastructure
//! adapters. Multi-platform support is provided via compile-time `cfg`
//! selection.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod state;
pub mod ui;

/// Catalog compiled into the binary.
pub const EMBEDDED_CATALOG: &str = include_str!("../assets/content.json");

pub use config::PlayerConfig;
pub use state::Platform;
pub use ui::app;

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_domain::{ContentCatalog, LocationId};

    #[test]
    fn embedded_catalog_parses() {
        let catalog = ContentCatalog::from_json(EMBEDDED_CATALOG).expect("catalog parses");
        assert_eq!(catalog.len(), 4);

        let harbour = catalog
            .get(&LocationId::parse("harbour-gate").expect("valid id"))
            .expect("harbour gate present");
        assert!(harbour.widget_video().is_some());

        let chapel = catalog
            .get(&LocationId::parse("chapel").expect("valid id"))
            .expect("chapel present");
        assert!(!chapel.has_video());
    }
}
