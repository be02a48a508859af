//! Subscribe call stream

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{SinkExt, Stream, StreamExt};

use crate::error::{Error, Result};
use crate::proto::{ReadingWithMeta, ServerFrame};

use super::connector::{Reader, Writer};

/// Stream of readings from an open subscribe call
///
/// Dropping the stream closes the connection, which cancels the server-side
/// session.
pub struct ReadingStream {
    reader: Reader,
    // Kept open: closing our write half is how the server learns we left
    writer: Writer,
}

impl ReadingStream {
    pub(super) fn new(reader: Reader, writer: Writer) -> Self {
        Self { reader, writer }
    }

    /// Receive the next reading; `None` once the server ends the call
    pub async fn recv(&mut self) -> Option<Result<ReadingWithMeta>> {
        self.next().await
    }

    /// End the call
    pub async fn close(mut self) -> Result<()> {
        self.writer.close().await
    }
}

impl Stream for ReadingStream {
    type Item = Result<ReadingWithMeta>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let frame = match Pin::new(&mut self.reader).poll_next(cx) {
            Poll::Ready(frame) => frame,
            Poll::Pending => return Poll::Pending,
        };

        Poll::Ready(frame.map(
            |frame: Result<ServerFrame>| -> Result<ReadingWithMeta> {
                match frame? {
                    ServerFrame::Reading(msg) => Ok(msg),
                    ServerFrame::Error { message } => Err(Error::Protocol(message)),
                    other => Err(Error::Protocol(format!(
                        "unexpected {} frame on subscribe call",
                        other.kind()
                    ))),
                }
            },
        ))
    }
}
