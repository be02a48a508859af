//! Streaming transport server
//!
//! Accepts TCP connections and runs one call per connection against a shared
//! [`Hub`](crate::hub::Hub).

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::TelemetryServer;
