//! Push-transport client connections

use std::future::Future;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// A push-transport client that accepts serialized text frames
pub trait PushSink: Send {
    /// Push one frame; an error means the client is gone
    fn push(&mut self, frame: String) -> impl Future<Output = Result<()>> + Send;
}

impl PushSink for SplitSink<WebSocket, Message> {
    async fn push(&mut self, frame: String) -> Result<()> {
        self.send(Message::Text(frame.into()))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))
    }
}

impl PushSink for mpsc::Sender<String> {
    async fn push(&mut self, frame: String) -> Result<()> {
        self.send(frame).await.map_err(|_| Error::SinkClosed)
    }
}
