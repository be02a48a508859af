//! Transport client
//!
//! Opens one TCP connection per call, the same way the server runs one call
//! per connection.

use futures::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::error::{Error, Result};
use crate::proto::{ClientCodec, ClientFrame, Pong, ServerFrame, Subscription};

use super::config::ClientConfig;
use super::publisher::Publisher;
use super::subscriber::ReadingStream;

pub(super) type Reader = FramedRead<OwnedReadHalf, ClientCodec>;
pub(super) type Writer = FramedWrite<OwnedWriteHalf, ClientCodec>;

/// Client for the streaming transport
///
/// # Example
/// ```no_run
/// use streamswitch::client::{ClientConfig, TelemetryClient};
/// use streamswitch::proto::{Reading, Subscription};
///
/// # async fn example() -> streamswitch::error::Result<()> {
/// let client = TelemetryClient::new(ClientConfig::new("localhost:50051"));
///
/// let mut publisher = client.publish().await?;
/// publisher.send(Reading::new("s1", 0, 21.5, 1)).await?;
/// let ack = publisher.finish().await?;
/// println!("last seq: {}", ack.last_seq);
///
/// let mut readings = client.subscribe(Subscription::sensors(["s1"])).await?;
/// while let Some(msg) = readings.recv().await {
///     println!("{:?}", msg?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    config: ClientConfig,
}

impl TelemetryClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a publish call
    pub async fn publish(&self) -> Result<Publisher> {
        let (reader, mut writer) = self.connect().await?;
        writer.send(ClientFrame::Publish).await?;
        Ok(Publisher::new(reader, writer))
    }

    /// Open a subscribe call
    ///
    /// Returns once the server has registered the subscription, so every
    /// reading published after this returns is eligible for delivery.
    pub async fn subscribe(&self, subscription: Subscription) -> Result<ReadingStream> {
        let (mut reader, mut writer) = self.connect().await?;
        writer.send(ClientFrame::Subscribe(subscription)).await?;

        match reader.next().await {
            Some(Ok(ServerFrame::Subscribed)) => Ok(ReadingStream::new(reader, writer)),
            Some(Ok(ServerFrame::Error { message })) => Err(Error::SubscribeRejected(message)),
            Some(Ok(other)) => Err(Error::Protocol(format!(
                "unexpected {} frame opening subscribe call",
                other.kind()
            ))),
            Some(Err(e)) => Err(e),
            None => Err(Error::ConnectionClosed),
        }
    }

    /// Single bench round trip
    pub async fn ping(&self, n: u64) -> Result<Pong> {
        let (mut reader, mut writer) = self.connect().await?;
        writer.send(ClientFrame::Ping { n }).await?;

        let pong = match reader.next().await {
            Some(Ok(ServerFrame::Pong(pong))) => pong,
            Some(Ok(ServerFrame::Error { message })) => return Err(Error::Protocol(message)),
            Some(Ok(other)) => {
                return Err(Error::Protocol(format!(
                    "unexpected {} frame on ping call",
                    other.kind()
                )))
            }
            Some(Err(e)) => return Err(e),
            None => return Err(Error::ConnectionClosed),
        };
        writer.close().await?;
        Ok(pong)
    }

    async fn connect(&self) -> Result<(Reader, Writer)> {
        let socket = tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(&self.config.target),
        )
        .await??;

        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }

        tracing::debug!(target_addr = %self.config.target, "Connected to telemetry server");

        let (read_half, write_half) = socket.into_split();
        let reader = FramedRead::new(read_half, ClientCodec::new(self.config.max_frame_length));
        let writer = FramedWrite::new(write_half, ClientCodec::new(self.config.max_frame_length));
        Ok((reader, writer))
    }
}
