//! WebSocket gateway
//!
//! HTTP routes:
//!
//! - `GET /ws/subscribe?sensor_id=<id>&sample_rate_hz=<hz>`: upgrade and run
//!   one [`BridgeSession`] for the connection
//! - `GET /health`: `{"status":"ok"}`

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::client::TelemetryClient;
use crate::error::Result;
use crate::proto::Subscription;

use super::config::GatewayConfig;
use super::session::BridgeSession;
use super::upstream::SubscribeUpstream;

/// Query parameters of the subscribe route
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeParams {
    pub sensor_id: Option<String>,
    pub sample_rate_hz: Option<f64>,
}

impl SubscribeParams {
    /// Subscription requested by these parameters
    pub fn subscription(&self) -> Subscription {
        let subscription = Subscription::from_filter(self.sensor_id.as_deref());
        match self.sample_rate_hz {
            Some(hz) => subscription.sample_rate(hz),
            None => subscription,
        }
    }
}

struct GatewayState<U> {
    upstream: Arc<U>,
    next_session_id: Arc<AtomicU64>,
}

impl<U> Clone for GatewayState<U> {
    fn clone(&self) -> Self {
        Self {
            upstream: Arc::clone(&self.upstream),
            next_session_id: Arc::clone(&self.next_session_id),
        }
    }
}

/// Push-transport gateway in front of a subscribe upstream
pub struct Gateway<U> {
    state: GatewayState<U>,
}

impl Gateway<TelemetryClient> {
    /// Gateway bridging to the streaming transport
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(TelemetryClient::new(config.client.clone()))
    }
}

impl<U> Gateway<U>
where
    U: SubscribeUpstream + 'static,
{
    pub fn new(upstream: U) -> Self {
        Self {
            state: GatewayState {
                upstream: Arc::new(upstream),
                next_session_id: Arc::new(AtomicU64::new(1)),
            },
        }
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws/subscribe", get(ws_subscribe::<U>))
            .route("/health", get(health))
            .with_state(self.state.clone())
    }

    /// Bind and serve until `shutdown` resolves
    pub async fn run_until<F>(&self, config: &GatewayConfig, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(config.bind_addr).await?;
        self.serve_until(listener, shutdown).await
    }

    /// Serve from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.serve_until(listener, std::future::pending()).await
    }

    /// Serve from an already bound listener until `shutdown` resolves
    pub async fn serve_until<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = %listener.local_addr()?, "Gateway listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ws_subscribe<U>(
    ws: WebSocketUpgrade,
    Query(params): Query<SubscribeParams>,
    State(state): State<GatewayState<U>>,
) -> impl IntoResponse
where
    U: SubscribeUpstream + 'static,
{
    ws.on_upgrade(move |socket| bridge(socket, params.subscription(), state))
}

async fn bridge<U>(socket: WebSocket, subscription: Subscription, state: GatewayState<U>)
where
    U: SubscribeUpstream + 'static,
{
    let session_id = state.next_session_id.fetch_add(1, Ordering::Relaxed);
    let (mut ws_tx, mut ws_rx) = socket.split();
    let session = BridgeSession::new(session_id, subscription);

    tokio::select! {
        result = session.run(state.upstream.as_ref(), &mut ws_tx) => {
            if let Err(e) = result {
                tracing::debug!(session_id = session_id, error = %e, "Bridge session ended");
            }
        }
        _ = closed(&mut ws_rx) => {
            tracing::debug!(session_id = session_id, "Client disconnected");
        }
    }

    if let Err(e) = ws_tx.close().await {
        tracing::debug!(session_id = session_id, error = %e, "Failed to close client socket");
    }
}

/// Resolves once the client closes or the socket fails
async fn closed(rx: &mut SplitStream<WebSocket>) {
    while let Some(Ok(msg)) = rx.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_to_wildcard() {
        let subscription = SubscribeParams::default().subscription();

        assert!(subscription.is_wildcard());
        assert_eq!(subscription.sample_rate_hz, 0.0);
    }

    #[test]
    fn test_params_with_filter_and_rate() {
        let params = SubscribeParams {
            sensor_id: Some("s1".into()),
            sample_rate_hz: Some(10.0),
        };
        let subscription = params.subscription();

        assert_eq!(subscription.sensor_ids, vec!["s1".to_string()]);
        assert_eq!(subscription.sample_rate_hz, 10.0);
    }

    #[test]
    fn test_empty_filter_is_wildcard() {
        let params = SubscribeParams {
            sensor_id: Some(String::new()),
            sample_rate_hz: None,
        };

        assert!(params.subscription().is_wildcard());
    }
}
