//! Streaming transport client
//!
//! Provides the client side of the three calls:
//! - Publishing readings and collecting the final ack
//! - Subscribing to a reading stream
//! - Bench ping round trips

pub mod config;
pub mod connector;
pub mod publisher;
pub mod subscriber;

pub use config::ClientConfig;
pub use connector::TelemetryClient;
pub use publisher::Publisher;
pub use subscriber::ReadingStream;
