//! Hub configuration

use std::time::Duration;

/// Default bounded capacity of each subscriber queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default wake-up tick of subscriber sessions
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

const MIN_QUEUE_CAPACITY: usize = 1;

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Hub and subscriber-session tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Capacity of each subscriber queue; broadcasts to a full queue are dropped
    pub queue_capacity: usize,

    /// Periodic wake-up of subscriber sessions (bounds cancellation latency)
    pub tick_interval: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl HubConfig {
    /// Set the subscriber queue capacity (minimum 1)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self.clamped()
    }

    /// Set the subscriber session tick interval (minimum 1ms)
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self.clamped()
    }

    /// Raise fields set directly below their minimums
    pub fn clamped(self) -> Self {
        Self {
            queue_capacity: self.queue_capacity.max(MIN_QUEUE_CAPACITY),
            tick_interval: self.tick_interval.max(MIN_TICK_INTERVAL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();

        assert_eq!(config.queue_capacity, 1024);
        assert_eq!(config.tick_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_builder_chaining() {
        let config = HubConfig::default()
            .queue_capacity(8)
            .tick_interval(Duration::from_millis(5));

        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.tick_interval, Duration::from_millis(5));
    }

    #[test]
    fn test_builder_lower_bounds() {
        // A zero-capacity mpsc channel panics, and a zero interval panics in tokio
        let config = HubConfig::default()
            .queue_capacity(0)
            .tick_interval(Duration::ZERO);

        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.tick_interval, Duration::from_millis(1));
    }
}
