//! Relay configuration

use std::time::Duration;

/// Default User-Agent presented to upstream servers
pub const DEFAULT_USER_AGENT: &str = "OTTGate/0.1";

/// Default upstream connect timeout
///
/// There is deliberately no read timeout: live TS feeds stay open for hours
/// and the client-side backpressure can legitimately stall reads for a while.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Maximum redirect hops followed before giving up
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Configuration for the upstream fetcher
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// User-Agent header sent upstream
    pub user_agent: String,
    /// Connect timeout for upstream sockets
    pub connect_timeout: Duration,
    /// Redirect hop bound
    pub max_redirects: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl RelayConfig {
    /// Build the configuration from `OTTGATE_*` environment variables,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let user_agent = std::env::var("OTTGATE_USER_AGENT")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.user_agent);

        let connect_timeout = std::env::var("OTTGATE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        Self {
            user_agent,
            connect_timeout,
            max_redirects: defaults.max_redirects,
        }
    }
}
