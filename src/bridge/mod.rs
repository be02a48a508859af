//! Push-transport bridge
//!
//! Exposes subscriber streams to WebSocket clients. Each client connection
//! runs one [`BridgeSession`] against a [`SubscribeUpstream`]: the network
//! [`TelemetryClient`](crate::client::TelemetryClient) in the gateway binary,
//! or a [`HubUpstream`] in process.

pub mod config;
pub mod frame;
pub mod gateway;
pub mod session;
pub mod sink;
pub mod upstream;

pub use config::GatewayConfig;
pub use frame::{PushFrame, SUBSCRIBE_FAILED_FRAME};
pub use gateway::{Gateway, SubscribeParams};
pub use session::BridgeSession;
pub use sink::PushSink;
pub use upstream::{HubUpstream, LocalReadingStream, SubscribeUpstream};
