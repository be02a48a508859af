//! Publisher ingest session
//!
//! Consumes one publisher's readings until the stream ends, broadcasting each
//! one through the hub as it arrives, then produces the publish [`Ack`].

use std::sync::Arc;
use std::time::Instant;

use futures::{Stream, StreamExt};

use crate::error::Result;
use crate::hub::Hub;
use crate::proto::{Ack, Reading};

/// One publisher connection's ingest loop
pub struct IngestSession {
    session_id: u64,
    hub: Arc<Hub>,
}

impl IngestSession {
    /// Create a new ingest session
    pub fn new(session_id: u64, hub: Arc<Hub>) -> Self {
        Self { session_id, hub }
    }

    /// Forward readings to the hub until the stream ends
    ///
    /// A clean end and an error item end the session the same way. The ack
    /// carries the seq of the last reading received, which is not
    /// necessarily the largest.
    pub async fn run<S>(self, readings: S) -> Ack
    where
        S: Stream<Item = Result<Reading>>,
    {
        let started = Instant::now();
        let mut readings = std::pin::pin!(readings);
        let mut last_seq = 0u64;
        let mut count = 0u64;

        while let Some(item) = readings.next().await {
            match item {
                Ok(reading) => {
                    last_seq = reading.seq;
                    count += 1;
                    self.hub.broadcast(reading);
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = self.session_id,
                        error = %e,
                        "Publish stream ended with error"
                    );
                    break;
                }
            }
        }

        tracing::info!(
            session_id = self.session_id,
            readings = count,
            last_seq = last_seq,
            duration_ms = started.elapsed().as_millis() as u64,
            "Publish session closed"
        );

        Ack { last_seq }
    }
}
