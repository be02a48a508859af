//! Hub implementation
//!
//! The central registry that maps topics to subscriber queues and fans
//! readings out to them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::proto::{unix_nanos, Reading, ReadingWithMeta};
use crate::stats::HubStats;

use super::config::HubConfig;
use super::queue::SubscriberQueue;
use super::registration::Registration;
use super::topic::{TopicKey, WILDCARD};

/// Subscriber registry and broadcaster
///
/// Registry mutation takes the write lock; `broadcast` only takes the read
/// lock, so concurrent publishers never serialize on each other. The lock is
/// synchronous because no operation awaits while holding it and
/// [`Registration`] must be able to release from `Drop`.
pub struct Hub {
    /// Map of topic key (`"*"` or sensor id) to registered queues
    topics: RwLock<HashMap<String, Vec<SubscriberQueue>>>,

    /// Configuration
    config: HubConfig,

    next_queue_id: AtomicU64,

    broadcasts: AtomicU64,
}

impl Hub {
    /// Create a new hub with default configuration
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a new hub with custom configuration
    ///
    /// Out-of-range fields are raised to their minimums.
    pub fn with_config(config: HubConfig) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            config: config.clamped(),
            next_queue_id: AtomicU64::new(1),
            broadcasts: AtomicU64::new(0),
        }
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Create a new bounded subscriber queue
    ///
    /// The returned [`SubscriberQueue`] is what gets registered; the receiver
    /// belongs to the subscribing session.
    pub fn queue(&self) -> (SubscriberQueue, mpsc::Receiver<ReadingWithMeta>) {
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let id = self.next_queue_id.fetch_add(1, Ordering::Relaxed);
        (SubscriberQueue::new(id, tx), rx)
    }

    /// Register a queue under a topic
    ///
    /// The queue is appended to the topic's list. Dropping or releasing the
    /// returned handle removes exactly this reference.
    pub fn register(self: &Arc<Self>, topic: TopicKey, queue: &SubscriberQueue) -> Registration {
        let subscribers = {
            let mut topics = self.topics.write();
            let list = topics.entry(topic.as_str().to_owned()).or_default();
            list.push(queue.clone());
            list.len()
        };

        tracing::debug!(
            topic = %topic,
            queue_id = queue.id(),
            subscribers = subscribers,
            "Subscriber queue registered"
        );

        Registration::new(Arc::downgrade(self), topic, queue.id())
    }

    /// Remove one reference to `queue_id` from `topic`
    ///
    /// Does nothing if the reference (or the topic) is already gone.
    pub(super) fn unregister(&self, topic: &TopicKey, queue_id: u64) {
        let mut topics = self.topics.write();

        let Some(list) = topics.get_mut(topic.as_str()) else {
            return;
        };
        let Some(pos) = list.iter().position(|q| q.id() == queue_id) else {
            return;
        };
        list.remove(pos);
        let remaining = list.len();
        if remaining == 0 {
            topics.remove(topic.as_str());
        }
        drop(topics);

        tracing::debug!(
            topic = %topic,
            queue_id = queue_id,
            subscribers = remaining,
            "Subscriber queue unregistered"
        );
    }

    /// Broadcast a reading to every matching subscriber queue
    ///
    /// Stamps `received_ts = sent_ts = now`, then offers the message to the
    /// wildcard queues followed by the sensor's own queues. A queue that is
    /// full (or whose session is gone) misses this message. Never blocks.
    pub fn broadcast(&self, reading: Reading) {
        let msg = ReadingWithMeta::stamped(Arc::new(reading), unix_nanos());
        self.broadcasts.fetch_add(1, Ordering::Relaxed);

        let topics = self.topics.read();
        let wildcard = topics.get(WILDCARD).map(Vec::as_slice).unwrap_or_default();
        let sensor = topics
            .get(msg.reading.sensor_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut delivered = 0usize;
        for queue in wildcard.iter().chain(sensor) {
            if queue.offer(msg.clone()) {
                delivered += 1;
            }
        }

        tracing::trace!(
            sensor_id = %msg.reading.sensor_id,
            seq = msg.reading.seq,
            delivered = delivered,
            "Reading broadcast"
        );
    }

    /// Number of queues registered under a topic
    pub fn subscriber_count(&self, topic: &TopicKey) -> usize {
        self.topics
            .read()
            .get(topic.as_str())
            .map_or(0, Vec::len)
    }

    /// Number of topics with at least one registration
    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }

    /// Snapshot of hub statistics
    pub fn stats(&self) -> HubStats {
        let topics = self.topics.read();
        HubStats {
            topics: topics.len(),
            registrations: topics.values().map(Vec::len).sum(),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(sensor: &str, seq: u64) -> Reading {
        Reading::new(sensor, 0, seq as f64, seq)
    }

    #[tokio::test]
    async fn test_fan_out_wildcard_and_sensor() {
        let hub = Arc::new(Hub::new());
        let mut receivers = Vec::new();
        let mut registrations = Vec::new();

        // Two wildcard subscribers, three on "s1", one on "s2"
        for topic in ["*", "*", "s1", "s1", "s1", "s2"] {
            let (queue, rx) = hub.queue();
            registrations.push(hub.register(TopicKey::from(topic), &queue));
            receivers.push((topic, rx));
        }

        hub.broadcast(reading("s1", 1));

        for (topic, rx) in receivers.iter_mut() {
            let expected = if *topic == "s2" { 0 } else { 1 };
            let mut got = 0;
            while let Ok(msg) = rx.try_recv() {
                assert_eq!(msg.reading.sensor_id, "s1");
                got += 1;
            }
            assert_eq!(got, expected, "topic {}", topic);
        }
    }

    #[tokio::test]
    async fn test_same_queue_on_wildcard_and_sensor_gets_two_copies() {
        let hub = Arc::new(Hub::new());
        let (queue, mut rx) = hub.queue();
        let _wild = hub.register(TopicKey::Wildcard, &queue);
        let _s1 = hub.register(TopicKey::from("s1"), &queue);

        hub.broadcast(reading("s1", 1));

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_stamps_meta() {
        let hub = Arc::new(Hub::new());
        let (queue, mut rx) = hub.queue();
        let _reg = hub.register(TopicKey::Wildcard, &queue);

        let before = unix_nanos();
        hub.broadcast(reading("s1", 1));
        let after = unix_nanos();

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.meta.received_ts, msg.meta.sent_ts);
        assert!(msg.meta.received_ts >= before && msg.meta.received_ts <= after);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_affecting_others() {
        let hub = Arc::new(Hub::with_config(HubConfig::default().queue_capacity(2)));
        let (slow, mut slow_rx) = hub.queue();
        let (fast, mut fast_rx) = hub.queue();
        let _slow = hub.register(TopicKey::Wildcard, &slow);
        let _fast = hub.register(TopicKey::Wildcard, &fast);

        for seq in 1..=5 {
            hub.broadcast(reading("s1", seq));
            // The fast subscriber keeps draining
            assert_eq!(fast_rx.try_recv().unwrap().reading.seq, seq);
        }

        // Only the first two fit in the slow queue
        assert_eq!(slow_rx.try_recv().unwrap().reading.seq, 1);
        assert_eq!(slow_rx.try_recv().unwrap().reading.seq, 2);
        assert!(slow_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_receiver_is_skipped() {
        let hub = Arc::new(Hub::new());
        let (queue, rx) = hub.queue();
        let _reg = hub.register(TopicKey::Wildcard, &queue);
        drop(rx);

        // Must not panic or error
        hub.broadcast(reading("s1", 1));
        assert_eq!(hub.stats().broadcasts, 1);
    }

    #[tokio::test]
    async fn test_release_is_idempotent_and_precise() {
        let hub = Arc::new(Hub::new());
        let (a, mut a_rx) = hub.queue();
        let (b, mut b_rx) = hub.queue();
        let reg_a = hub.register(TopicKey::from("s1"), &a);
        let _reg_b = hub.register(TopicKey::from("s1"), &b);
        assert_eq!(hub.subscriber_count(&TopicKey::from("s1")), 2);

        reg_a.release();
        reg_a.release();
        assert!(reg_a.is_released());
        assert_eq!(hub.subscriber_count(&TopicKey::from("s1")), 1);

        hub.broadcast(reading("s1", 1));
        assert!(a_rx.try_recv().is_err());
        assert_eq!(b_rx.try_recv().unwrap().reading.seq, 1);
    }

    #[tokio::test]
    async fn test_drop_releases_and_empty_topic_is_removed() {
        let hub = Arc::new(Hub::new());
        let (queue, _rx) = hub.queue();

        let reg = hub.register(TopicKey::from("s1"), &queue);
        assert_eq!(hub.topic_count(), 1);

        drop(reg);
        assert_eq!(hub.topic_count(), 0);
        assert_eq!(hub.subscriber_count(&TopicKey::from("s1")), 0);
    }

    #[tokio::test]
    async fn test_duplicate_registration_released_one_at_a_time() {
        let hub = Arc::new(Hub::new());
        let (queue, _rx) = hub.queue();
        let first = hub.register(TopicKey::from("s1"), &queue);
        let second = hub.register(TopicKey::from("s1"), &queue);
        assert_eq!(hub.subscriber_count(&TopicKey::from("s1")), 2);

        first.release();
        assert_eq!(hub.subscriber_count(&TopicKey::from("s1")), 1);
        // Releasing again must not remove the second reference
        first.release();
        assert_eq!(hub.subscriber_count(&TopicKey::from("s1")), 1);

        second.release();
        assert_eq!(hub.topic_count(), 0);
    }

    #[tokio::test]
    async fn test_release_after_hub_dropped() {
        let hub = Arc::new(Hub::new());
        let (queue, _rx) = hub.queue();
        let reg = hub.register(TopicKey::Wildcard, &queue);

        drop(hub);
        reg.release();
        assert!(reg.is_released());
    }

    #[tokio::test]
    async fn test_stats() {
        let hub = Arc::new(Hub::new());
        let (queue, _rx) = hub.queue();
        let _a = hub.register(TopicKey::Wildcard, &queue);
        let _b = hub.register(TopicKey::from("s1"), &queue);
        let _c = hub.register(TopicKey::from("s2"), &queue);
        hub.broadcast(reading("s1", 1));

        let stats = hub.stats();
        assert_eq!(stats.topics, 3);
        assert_eq!(stats.registrations, 3);
        assert_eq!(stats.broadcasts, 1);
    }

    #[tokio::test]
    async fn test_queue_ids_are_unique() {
        let hub = Hub::new();
        let (a, _) = hub.queue();
        let (b, _) = hub.queue();
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_out_of_range_config_is_clamped() {
        let hub = Arc::new(Hub::with_config(HubConfig {
            queue_capacity: 0,
            tick_interval: std::time::Duration::ZERO,
        }));

        assert_eq!(hub.config().queue_capacity, 1);
        assert_eq!(hub.config().tick_interval, std::time::Duration::from_millis(1));

        // A zero-capacity channel would panic here
        let (queue, mut rx) = hub.queue();
        let _registration = hub.register(TopicKey::sensor("s1"), &queue);
        hub.broadcast(reading("s1", 1));
        hub.broadcast(reading("s1", 2));

        assert_eq!(rx.recv().await.unwrap().reading.seq, 1);
        assert!(rx.try_recv().is_err());
    }
}
