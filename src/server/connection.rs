//! Per-connection call dispatch
//!
//! The first frame a client sends selects the call (publish, subscribe or
//! ping); the connection then runs the matching session until the call ends.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWrite;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::hub::Hub;
use crate::proto::{
    unix_nanos, ClientFrame, Pong, Reading, ReadingWithMeta, ServerCodec, ServerFrame, Subscription,
};
use crate::server::config::ServerConfig;
use crate::session::{DeliverySink, IngestSession, SubscriberSession};

type Reader = FramedRead<OwnedReadHalf, ServerCodec>;
type Writer = FramedWrite<OwnedWriteHalf, ServerCodec>;

/// One accepted transport connection
pub struct Connection {
    session_id: u64,
    peer_addr: SocketAddr,
    config: ServerConfig,
    hub: Arc<Hub>,
}

impl Connection {
    /// Create a connection handler
    pub fn new(session_id: u64, peer_addr: SocketAddr, config: ServerConfig, hub: Arc<Hub>) -> Self {
        Self {
            session_id,
            peer_addr,
            config,
            hub,
        }
    }

    /// Read the opening frame and run the selected call to completion
    pub async fn run(self, socket: TcpStream) -> Result<()> {
        let (read_half, write_half) = socket.into_split();
        let mut reader = FramedRead::new(read_half, ServerCodec::new(self.config.max_frame_length));
        let mut writer =
            FramedWrite::new(write_half, ServerCodec::new(self.config.max_frame_length));

        let Ok(opened) = tokio::time::timeout(self.config.open_timeout, reader.next()).await else {
            reject(&mut writer, "no call opened before the deadline".to_string()).await;
            return Err(Error::Timeout);
        };

        let first = match opened {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                reject(&mut writer, e.to_string()).await;
                return Err(e);
            }
            // Closed before opening a call
            None => return Ok(()),
        };

        tracing::debug!(
            session_id = self.session_id,
            peer = %self.peer_addr,
            call = first.kind(),
            "Call opened"
        );

        match first {
            ClientFrame::Publish => self.publish(reader, writer).await,
            ClientFrame::Subscribe(subscription) => {
                self.subscribe(subscription, reader, writer).await
            }
            ClientFrame::Ping { n } => self.ping(n, reader, writer).await,
            other => {
                let message = format!(
                    "unexpected {} frame, expected publish, subscribe or ping",
                    other.kind()
                );
                reject(&mut writer, message.clone()).await;
                Err(Error::Protocol(message))
            }
        }
    }

    async fn publish(self, reader: Reader, mut writer: Writer) -> Result<()> {
        let readings = reader.map(|frame: Result<ClientFrame>| -> Result<Reading> {
            match frame? {
                ClientFrame::Reading(reading) => Ok(reading),
                other => Err(Error::Protocol(format!(
                    "unexpected {} frame on publish call",
                    other.kind()
                ))),
            }
        });

        let ack = IngestSession::new(self.session_id, Arc::clone(&self.hub))
            .run(readings)
            .await;

        writer.send(ServerFrame::Ack(ack)).await?;
        writer.close().await?;
        Ok(())
    }

    async fn subscribe(
        self,
        subscription: Subscription,
        mut reader: Reader,
        mut writer: Writer,
    ) -> Result<()> {
        let cancel = CancellationToken::new();
        let session =
            match SubscriberSession::open(self.session_id, &self.hub, subscription, cancel.clone())
            {
                Ok(session) => session,
                Err(e) => {
                    reject(&mut writer, e.to_string()).await;
                    return Err(e);
                }
            };
        writer.send(ServerFrame::Subscribed).await?;

        // Client half-close or disconnect cancels the session
        let session_id = self.session_id;
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                while let Some(frame) = reader.next().await {
                    match frame {
                        Ok(frame) => tracing::trace!(
                            session_id = session_id,
                            kind = frame.kind(),
                            "Ignoring frame on subscribe call"
                        ),
                        Err(_) => break,
                    }
                }
                cancel.cancel();
            }
        });

        let result = session.run(&mut writer).await;
        watcher.abort();
        result.map(|_| ())
    }

    async fn ping(self, n: u64, mut reader: Reader, mut writer: Writer) -> Result<()> {
        writer.send(pong(n)).await?;

        while let Some(frame) = reader.next().await {
            match frame? {
                ClientFrame::Ping { n } => writer.send(pong(n)).await?,
                other => {
                    let message = format!("unexpected {} frame on ping call", other.kind());
                    reject(&mut writer, message.clone()).await;
                    return Err(Error::Protocol(message));
                }
            }
        }
        Ok(())
    }
}

impl<W> DeliverySink for FramedWrite<W, ServerCodec>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn deliver(&mut self, msg: ReadingWithMeta) -> Result<()> {
        self.send(ServerFrame::Reading(msg)).await
    }
}

fn pong(n: u64) -> ServerFrame {
    ServerFrame::Pong(Pong {
        n,
        ts_unix_nano: unix_nanos(),
    })
}

/// Send the terminal error frame; the peer may already be gone
async fn reject(writer: &mut Writer, message: String) {
    if let Err(e) = writer.send(ServerFrame::Error { message }).await {
        tracing::debug!(error = %e, "Failed to send error frame");
    }
}
