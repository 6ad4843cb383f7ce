//! Player configuration.
//!
//! Defaults suit the hosted widget; on desktop each field can be overridden
//! with a `WAYMARK_*` environment variable. Unparseable values are logged and
//! ignored so a typo never prevents the viewer from starting.

use std::str::FromStr;

use waymark_domain::EndedPolicy;

use crate::application::player_adapter::{AdapterOptions, DEFAULT_POLL_INTERVAL_MS};
use crate::application::view_coordinator::{PlayIntent, TransitionPolicy};

pub const DEFAULT_WIDGET_SCRIPT_URL: &str = "https://www.youtube.com/iframe_api";
pub const DEFAULT_API_PROBE_MS: u32 = 100;
pub const DEFAULT_API_PROBE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub widget_script_url: String,
    /// Position poll period while playing.
    pub poll_interval_ms: u32,
    /// How often to check whether the script has exposed its player API.
    pub api_probe_ms: u32,
    /// Probes before giving up with `WidgetLoadError::ApiUnavailable`.
    pub api_probe_limit: u32,
    pub show_controls: bool,
    pub ended_policy: EndedPolicy,
    pub transition: TransitionPolicy,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            widget_script_url: DEFAULT_WIDGET_SCRIPT_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            api_probe_ms: DEFAULT_API_PROBE_MS,
            api_probe_limit: DEFAULT_API_PROBE_LIMIT,
            show_controls: true,
            ended_policy: EndedPolicy::default(),
            transition: TransitionPolicy::default(),
        }
    }
}

impl PlayerConfig {
    /// Defaults overridden by `WAYMARK_*` process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("WAYMARK_WIDGET_SCRIPT_URL").filter(|u| !u.trim().is_empty()) {
            config.widget_script_url = url.trim().to_string();
        }
        if let Some(ms) = parsed::<u32>(&lookup, "WAYMARK_POLL_INTERVAL_MS").filter(|ms| *ms > 0) {
            config.poll_interval_ms = ms;
        }
        if let Some(ms) = parsed::<u32>(&lookup, "WAYMARK_API_PROBE_MS").filter(|ms| *ms > 0) {
            config.api_probe_ms = ms;
        }
        if let Some(limit) = parsed::<u32>(&lookup, "WAYMARK_API_PROBE_LIMIT") {
            config.api_probe_limit = limit;
        }
        if let Some(show) = parsed::<bool>(&lookup, "WAYMARK_SHOW_CONTROLS") {
            config.show_controls = show;
        }
        if let Some(policy) = parsed::<EndedPolicy>(&lookup, "WAYMARK_ENDED_POLICY") {
            config.ended_policy = policy;
        }
        if let Some(intent) = parsed::<PlayIntent>(&lookup, "WAYMARK_ON_ENLARGE") {
            config.transition.on_enlarge = intent;
        }
        if let Some(intent) = parsed::<PlayIntent>(&lookup, "WAYMARK_ON_SHRINK") {
            config.transition.on_shrink = intent;
        }

        config
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            poll_interval_ms: self.poll_interval_ms,
            controls: self.show_controls,
            plays_inline: true,
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring invalid configuration value");
            None
        }
    }
}
