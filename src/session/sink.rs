//! Downstream of a subscriber session

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::proto::ReadingWithMeta;

/// Destination of the messages a subscriber session forwards
///
/// An error from `deliver` ends the session and is propagated to its caller.
pub trait DeliverySink: Send {
    /// Write one message downstream
    fn deliver(&mut self, msg: ReadingWithMeta) -> impl Future<Output = Result<()>> + Send;
}

impl DeliverySink for mpsc::Sender<ReadingWithMeta> {
    async fn deliver(&mut self, msg: ReadingWithMeta) -> Result<()> {
        self.send(msg).await.map_err(|_| Error::SinkClosed)
    }
}

impl DeliverySink for Vec<ReadingWithMeta> {
    async fn deliver(&mut self, msg: ReadingWithMeta) -> Result<()> {
        self.push(msg);
        Ok(())
    }
}
