//! Subscriber queue references held by the hub

use tokio::sync::mpsc;

use crate::proto::ReadingWithMeta;

/// Hub-side reference to one subscriber's bounded queue
///
/// The hub only ever attempts non-blocking enqueues through this handle; the
/// owning session holds the single receiver.
#[derive(Debug, Clone)]
pub struct SubscriberQueue {
    id: u64,
    tx: mpsc::Sender<ReadingWithMeta>,
}

impl SubscriberQueue {
    pub(super) fn new(id: u64, tx: mpsc::Sender<ReadingWithMeta>) -> Self {
        Self { id, tx }
    }

    /// Hub-unique queue identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Try to enqueue without waiting
    ///
    /// Returns false when the queue is full or its session is gone; the
    /// message is dropped in both cases.
    pub fn offer(&self, msg: ReadingWithMeta) -> bool {
        self.tx.try_send(msg).is_ok()
    }
}
