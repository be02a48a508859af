//! Registration cleanup handles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

use super::store::Hub;
use super::topic::TopicKey;

/// One-shot handle returned by [`Hub::register`]
///
/// Releasing removes exactly the registered queue reference from exactly its
/// topic. Release is idempotent and also runs on drop, so a session that
/// holds its registrations releases them on every exit path.
#[derive(Debug)]
pub struct Registration {
    hub: Weak<Hub>,
    topic: TopicKey,
    queue_id: u64,
    released: AtomicBool,
}

impl Registration {
    pub(super) fn new(hub: Weak<Hub>, topic: TopicKey, queue_id: u64) -> Self {
        Self {
            hub,
            topic,
            queue_id,
            released: AtomicBool::new(false),
        }
    }

    /// Topic this registration was made under
    pub fn topic(&self) -> &TopicKey {
        &self.topic
    }

    /// Queue this registration refers to
    pub fn queue_id(&self) -> u64 {
        self.queue_id
    }

    /// Whether the registration has already been released
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Remove the queue reference from the hub; later calls do nothing
    pub fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(hub) = self.hub.upgrade() {
            hub.unregister(&self.topic, self.queue_id);
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}
