//! Subscribe-call sources for the bridge
//!
//! A bridge reaches its subscriber session either over the streaming
//! transport ([`TelemetryClient`]) or in process ([`HubUpstream`]).

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::client::{ReadingStream, TelemetryClient};
use crate::error::Result;
use crate::hub::Hub;
use crate::proto::{ReadingWithMeta, Subscription};
use crate::session::SubscriberSession;

/// Something a bridge can open a subscribe call against
pub trait SubscribeUpstream: Send + Sync {
    /// Messages of one open call; the call ends when the stream is dropped
    type Stream: Stream<Item = Result<ReadingWithMeta>> + Send + Unpin;

    /// Open a subscribe call
    fn open(
        &self,
        subscription: Subscription,
    ) -> impl Future<Output = Result<Self::Stream>> + Send;
}

impl SubscribeUpstream for TelemetryClient {
    type Stream = ReadingStream;

    async fn open(&self, subscription: Subscription) -> Result<ReadingStream> {
        self.subscribe(subscription).await
    }
}

/// In-process upstream running subscriber sessions directly on a hub
pub struct HubUpstream {
    hub: Arc<Hub>,
    next_session_id: AtomicU64,
}

impl HubUpstream {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self {
            hub,
            next_session_id: AtomicU64::new(1),
        }
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }
}

impl SubscribeUpstream for HubUpstream {
    type Stream = LocalReadingStream;

    async fn open(&self, subscription: Subscription) -> Result<LocalReadingStream> {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let session = SubscriberSession::open(session_id, &self.hub, subscription, cancel.clone())?;

        let (mut tx, rx) = mpsc::channel(self.hub.config().queue_capacity);
        tokio::spawn(async move {
            if let Err(e) = session.run(&mut tx).await {
                tracing::debug!(session_id = session_id, error = %e, "Local subscriber ended");
            }
        });

        Ok(LocalReadingStream {
            rx,
            _cancel: cancel.drop_guard(),
        })
    }
}

/// Messages from an in-process subscriber session
///
/// Dropping the stream cancels the session.
pub struct LocalReadingStream {
    rx: mpsc::Receiver<ReadingWithMeta>,
    _cancel: DropGuard,
}

impl Stream for LocalReadingStream {
    type Item = Result<ReadingWithMeta>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx).map(|msg| msg.map(Ok))
    }
}
