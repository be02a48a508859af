//! Client configuration

use std::time::Duration;

use crate::proto::DEFAULT_MAX_FRAME_LENGTH;

/// Environment variable consulted when no target is given explicitly
pub const TARGET_ENV: &str = "STREAMSWITCH_TARGET";

/// Target used when none is configured or the configured one is unusable
pub const DEFAULT_TARGET: &str = "localhost:50051";

/// Transport client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address as `host:port`
    pub target: String,

    /// Time allowed for the TCP connect
    pub connect_timeout: Duration,

    /// Enable TCP_NODELAY
    pub tcp_nodelay: bool,

    /// Largest accepted frame in bytes
    pub max_frame_length: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            connect_timeout: Duration::from_secs(5),
            tcp_nodelay: true,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given target (sanitized, see [`resolve_target`](Self::resolve_target))
    pub fn new(target: &str) -> Self {
        Self {
            target: Self::resolve_target(Some(target)),
            ..Default::default()
        }
    }

    /// Create a config from an optional flag value, falling back to the environment
    pub fn from_flag_or_env(flag: Option<&str>) -> Self {
        let env = std::env::var(TARGET_ENV).ok();
        let candidate = flag.filter(|t| !t.is_empty()).or(env.as_deref());
        Self::new(candidate.unwrap_or_default())
    }

    /// Sanitize a `host:port` target
    ///
    /// Empty targets, targets containing `/` (URLs, paths) and targets
    /// without a `:` fall back to [`DEFAULT_TARGET`].
    pub fn resolve_target(candidate: Option<&str>) -> String {
        match candidate {
            Some(t) if !t.is_empty() && !t.contains('/') && t.contains(':') => t.to_string(),
            _ => DEFAULT_TARGET.to_string(),
        }
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum frame length
    pub fn max_frame_length(mut self, len: usize) -> Self {
        self.max_frame_length = len;
        self
    }
}
