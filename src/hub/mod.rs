//! Fan-out hub
//!
//! The hub maps topics to subscriber queues and broadcasts every published
//! reading to the queues that match it.
//!
//! # Architecture
//!
//! ```text
//!                          Arc<Hub>
//!                 ┌──────────────────────────┐
//!                 │ topics: RwLock<HashMap<  │
//!                 │   "*"  → [q1, q3]        │
//!                 │   "s1" → [q2, q3]        │
//!                 │ >>                       │
//!                 └────────────┬─────────────┘
//!                              │
//!      ┌───────────────────────┼──────────────────────┐
//!      │                       │                      │
//!      ▼                       ▼                      ▼
//! [IngestSession]     [SubscriberSession]    [SubscriberSession]
//! hub.broadcast()       q1.recv()              q2.recv()
//!      │                       │                      │
//!      └──► try_send ────────► sink ───────────────► TCP / WebSocket
//! ```
//!
//! # Drop-on-full
//!
//! Every subscriber queue is bounded. A broadcast that finds a queue full
//! skips it; a stalled subscriber never slows the publisher or other
//! subscribers.

pub mod config;
pub mod queue;
pub mod registration;
pub mod store;
pub mod topic;

pub use config::HubConfig;
pub use queue::SubscriberQueue;
pub use registration::Registration;
pub use store::Hub;
pub use topic::{TopicKey, WILDCARD};
