//! Push-transport frames
//!
//! One JSON text message per delivered reading:
//!
//! ```text
//! {"reading":{..},"meta":{..},"client_recv_unix_nano":1700000000000000000}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::proto::{Reading, ReadingWithMeta, ServerMeta};

/// The single frame pushed when the subscribe call cannot be opened
pub const SUBSCRIBE_FAILED_FRAME: &str = r#"{"error":"subscribe failed"}"#;

/// A delivered reading as pushed to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushFrame {
    pub reading: Arc<Reading>,
    pub meta: ServerMeta,
    /// Bridge-local receive time (ns since epoch)
    pub client_recv_unix_nano: i64,
}

impl PushFrame {
    /// Attach the bridge receive timestamp to a delivered message
    pub fn new(msg: ReadingWithMeta, client_recv_unix_nano: i64) -> Self {
        Self {
            reading: msg.reading,
            meta: msg.meta,
            client_recv_unix_nano,
        }
    }

    /// Serialize for the push transport
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
