use crate::scrapers::oddschecker::{ODDSCHECKER_ORIGIN, ODDSCHECKER_URL};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Runtime settings, read from the environment (and `.env`).
///
/// The target page and the wait timeouts are fixed; only pacing, artifacts,
/// link origin and the bind address can be changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    pub target_url: String,
    pub link_origin: String,
    pub ready_timeout: Duration,
    pub content_timeout: Duration,
    pub consent_pause: Duration,
    pub settle_delay: Duration,
    /// Directory for failure artifacts; `None` disables them
    pub debug_dir: Option<PathBuf>,
    pub bind_addr: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: ODDSCHECKER_URL.to_string(),
            link_origin: ODDSCHECKER_ORIGIN.to_string(),
            ready_timeout: Duration::from_secs(15),
            content_timeout: Duration::from_secs(20),
            consent_pause: Duration::from_secs(2),
            settle_delay: Duration::from_secs(5),
            debug_dir: Some(PathBuf::from(".")),
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| match lookup(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
                    default
                }
            },
        };

        let debug_enabled = lookup("DEBUG_ARTIFACTS")
            .map(|v| v.trim() != "0")
            .unwrap_or(true);
        let debug_dir = debug_enabled.then(|| {
            lookup("DEBUG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
        });

        Self {
            link_origin: lookup("LINK_ORIGIN").unwrap_or(defaults.link_origin),
            consent_pause: secs("CONSENT_PAUSE_SECS", defaults.consent_pause),
            settle_delay: secs("SETTLE_DELAY_SECS", defaults.settle_delay),
            debug_dir,
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            ..defaults
        }
    }
}
