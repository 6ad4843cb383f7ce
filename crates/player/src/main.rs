//! Waymark Player - composition root binary.

use std::sync::Arc;

use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waymark_domain::ContentCatalog;
use waymark_player::{PlayerConfig, EMBEDDED_CATALOG};

fn main() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waymark_player=debug,dioxus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    tracing::info!("Starting Waymark Player");

    // Configuration: environment overrides on desktop, defaults in the browser.
    #[cfg(not(target_arch = "wasm32"))]
    let config = PlayerConfig::from_env();
    #[cfg(target_arch = "wasm32")]
    let config = PlayerConfig::default();
    tracing::debug!(?config, "Player configuration");

    let catalog =
        ContentCatalog::from_json(EMBEDDED_CATALOG).context("embedded content catalog is invalid")?;
    tracing::info!(locations = catalog.len(), "Content catalog loaded");

    // Launch Dioxus
    #[allow(unused_mut)]
    let mut builder = dioxus::LaunchBuilder::new();

    #[cfg(not(target_arch = "wasm32"))]
    {
        let window = dioxus_desktop::WindowBuilder::new().with_title("Waymark");
        let cfg = dioxus_desktop::Config::new().with_window(window);
        builder = builder.with_cfg(cfg);
    }

    builder
        .with_context(config)
        .with_context(Arc::new(catalog))
        .launch(waymark_player::app);

    Ok(())
}
