//! Bridge session
//!
//! Adapts one push-transport client to one subscribe call: every message
//! received upstream is stamped with the bridge receive time and pushed as a
//! single JSON frame. Nothing is retried and nothing outlives the client.

use futures::StreamExt;

use crate::error::Result;
use crate::proto::{unix_nanos, Subscription};

use super::frame::{PushFrame, SUBSCRIBE_FAILED_FRAME};
use super::sink::PushSink;
use super::upstream::SubscribeUpstream;

/// One bridged client connection
#[derive(Debug, Clone)]
pub struct BridgeSession {
    session_id: u64,
    subscription: Subscription,
}

impl BridgeSession {
    pub fn new(session_id: u64, subscription: Subscription) -> Self {
        Self {
            session_id,
            subscription,
        }
    }

    /// Session for an optional client filter (absent or empty means all sensors)
    pub fn from_filter(session_id: u64, sensor_id: Option<&str>) -> Self {
        Self::new(session_id, Subscription::from_filter(sensor_id))
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Relay until the upstream stream ends or the client can't be written
    ///
    /// Returns the number of frames pushed. If the subscribe call cannot be
    /// opened, the client gets [`SUBSCRIBE_FAILED_FRAME`] and the open error
    /// is returned. An upstream error ends the session the same way a clean
    /// close does.
    pub async fn run<U, P>(self, upstream: &U, client: &mut P) -> Result<u64>
    where
        U: SubscribeUpstream,
        P: PushSink,
    {
        let mut stream = match upstream.open(self.subscription.clone()).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(session_id = self.session_id, error = %e, "Subscribe failed");
                if let Err(e) = client.push(SUBSCRIBE_FAILED_FRAME.to_string()).await {
                    tracing::debug!(session_id = self.session_id, error = %e, "Failed to push error frame");
                }
                return Err(e);
            }
        };

        tracing::info!(
            session_id = self.session_id,
            topics = ?self.subscription.sensor_ids,
            sample_rate_hz = self.subscription.sample_rate_hz,
            "Bridge session opened"
        );

        let mut pushed = 0u64;
        while let Some(msg) = stream.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(session_id = self.session_id, error = %e, "Upstream error");
                    break;
                }
            };

            let frame = PushFrame::new(msg, unix_nanos()).to_json()?;
            if let Err(e) = client.push(frame).await {
                tracing::debug!(session_id = self.session_id, error = %e, "Client write failed");
                return Err(e);
            }
            pushed += 1;
        }

        tracing::info!(session_id = self.session_id, pushed = pushed, "Bridge session closed");
        Ok(pushed)
    }
}
