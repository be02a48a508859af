//! Statistics for the hub and its sessions

pub mod metrics;

pub use metrics::{HubStats, SessionStats};
