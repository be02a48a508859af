//! Publish call handle
//!
//! High-level API for streaming readings to the server and collecting the
//! final acknowledgment.

use futures::{SinkExt, StreamExt};

use crate::error::{Error, Result};
use crate::proto::{Ack, ClientFrame, Reading, ServerFrame};

use super::connector::{Reader, Writer};

/// Open publish call
///
/// Readings are written as they are sent; nothing is buffered client-side
/// beyond the socket. Call [`finish`](Self::finish) to close the stream and
/// receive the [`Ack`].
pub struct Publisher {
    reader: Reader,
    writer: Writer,
    sent: u64,
}

impl Publisher {
    pub(super) fn new(reader: Reader, writer: Writer) -> Self {
        Self {
            reader,
            writer,
            sent: 0,
        }
    }

    /// Send one reading
    pub async fn send(&mut self, reading: Reading) -> Result<()> {
        self.writer.send(ClientFrame::Reading(reading)).await?;
        self.sent += 1;
        Ok(())
    }

    /// Number of readings sent so far
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Close the stream and wait for the server's acknowledgment
    ///
    /// The ack carries the seq of the last reading the server received.
    pub async fn finish(mut self) -> Result<Ack> {
        // Half-close: the server sees end of stream and replies
        self.writer.close().await?;

        match self.reader.next().await {
            Some(Ok(ServerFrame::Ack(ack))) => {
                tracing::debug!(sent = self.sent, last_seq = ack.last_seq, "Publish acknowledged");
                Ok(ack)
            }
            Some(Ok(ServerFrame::Error { message })) => Err(Error::Protocol(message)),
            Some(Ok(other)) => Err(Error::Protocol(format!(
                "unexpected {} frame closing publish call",
                other.kind()
            ))),
            Some(Err(e)) => Err(e),
            None => Err(Error::ConnectionClosed),
        }
    }
}
