//! Rate decimation
//!
//! Leaky decimation: a message is forwarded only if at least one interval has
//! passed since the last forwarded message. Everything else is discarded, not
//! merged or buffered.

use std::time::Duration;

use tokio::time::Instant;

/// Per-session rate limiter
#[derive(Debug, Clone)]
pub struct Decimator {
    interval: Option<Duration>,
    last_forwarded: Option<Instant>,
}

impl Decimator {
    /// Decimator enforcing at least `interval` between forwarded messages
    ///
    /// `None` admits everything.
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            last_forwarded: None,
        }
    }

    /// Minimum spacing, if throttled
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Decide whether a message dequeued at `now` is forwarded
    ///
    /// Records `now` as the last forward time when admitting.
    pub fn admit(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };

        if let Some(last) = self.last_forwarded {
            if now.saturating_duration_since(last) < interval {
                return false;
            }
        }
        self.last_forwarded = Some(now);
        true
    }
}
