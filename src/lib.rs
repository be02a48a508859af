//! streamswitch: live sensor reading fan-out
//!
//! Publishers stream [`Reading`](proto::Reading)s into a shared in-memory
//! [`Hub`](hub::Hub), which fans each one out to every subscriber following
//! that sensor or all sensors. Subscribers are served over a length-delimited
//! JSON transport on TCP, and over WebSocket through the bridge gateway.
//!
//! # Example
//!
//! ```no_run
//! use streamswitch::server::{ServerConfig, TelemetryServer};
//!
//! #[tokio::main]
//! async fn main() -> streamswitch::error::Result<()> {
//!     let server = TelemetryServer::new(ServerConfig::default());
//!     server.run().await
//! }
//! ```

pub mod bridge;
pub mod client;
pub mod error;
pub mod hub;
pub mod logging;
pub mod proto;
pub mod server;
pub mod session;
pub mod sim;
pub mod stats;

pub use bridge::{BridgeSession, Gateway, GatewayConfig};
pub use client::{ClientConfig, TelemetryClient};
pub use error::{Error, Result};
pub use hub::{Hub, HubConfig};
pub use proto::{Ack, Reading, ReadingWithMeta, ServerMeta, Subscription};
pub use server::{ServerConfig, TelemetryServer};
pub use session::{IngestSession, SubscriberSession};
pub use sim::{SimConfig, Simulator};
