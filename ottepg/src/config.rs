//! Guide configuration
//!
//! Environment-driven settings for the schedule store and the guide
//! endpoints. Every value has a sensible default so the server starts with
//! no configuration at all.

use crate::store::DEFAULT_SCHEDULE_TTL;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the externally generated schedule document
pub const DEFAULT_SCHEDULE_PATH: &str = "/output/schedule.json";

/// Default externally visible base URL, used to build playlist stream URLs
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration for the schedule store and guide rendering
#[derive(Debug, Clone)]
pub struct GuideConfig {
    /// Path of the schedule JSON document
    pub schedule_path: PathBuf,
    /// How long a loaded snapshot stays fresh
    pub cache_ttl: Duration,
    /// Externally visible base URL of this server
    pub base_url: String,
    /// Icon used on synthesized placeholder programs
    pub placeholder_icon_url: Option<String>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            schedule_path: PathBuf::from(DEFAULT_SCHEDULE_PATH),
            cache_ttl: DEFAULT_SCHEDULE_TTL,
            base_url: DEFAULT_BASE_URL.to_string(),
            placeholder_icon_url: None,
        }
    }
}

impl GuideConfig {
    /// Build the configuration from `OTTGATE_*` environment variables,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let schedule_path = std::env::var("OTTGATE_SCHEDULE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.schedule_path);

        let cache_ttl = std::env::var("OTTGATE_SCHEDULE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let base_url = std::env::var("OTTGATE_BASE_URL").unwrap_or(defaults.base_url);

        let placeholder_icon_url = std::env::var("OTTGATE_PLACEHOLDER_ICON")
            .ok()
            .filter(|v| !v.is_empty());

        Self {
            schedule_path,
            cache_ttl,
            base_url,
            placeholder_icon_url,
        }
    }
}
