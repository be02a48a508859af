//! Publisher, subscriber and delivery sessions
//!
//! Each connection to the transport runs exactly one session:
//!
//! - [`IngestSession`]: publisher readings → `Hub::broadcast`
//! - [`SubscriberSession`]: hub queue → decimation → [`DeliverySink`]

pub mod decimator;
pub mod ingest;
pub mod sink;
pub mod subscriber;

pub use decimator::Decimator;
pub use ingest::IngestSession;
pub use sink::DeliverySink;
pub use subscriber::SubscriberSession;
