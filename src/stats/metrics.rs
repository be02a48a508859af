//! Statistics for hub and subscriber sessions

use std::time::Duration;

/// Subscriber-session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Messages forwarded downstream
    pub forwarded: u64,
    /// Messages discarded by rate decimation
    pub decimated: u64,
    /// Session duration
    pub duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Total messages taken off the queue
    pub fn dequeued(&self) -> u64 {
        self.forwarded + self.decimated
    }

    /// Average forwarding rate over the session
    pub fn forward_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.forwarded as f64 / secs
        } else {
            0.0
        }
    }
}

/// Hub-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Topics with at least one registered queue
    pub topics: usize,
    /// Registered queue references across all topics
    pub registrations: usize,
    /// Readings broadcast since the hub was created
    pub broadcasts: u64,
}
