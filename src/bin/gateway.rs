//! WebSocket bridge to a streamswitch server
//!
//! ```text
//! PORT=8080 STREAMSWITCH_TARGET=localhost:50051 streamswitch-gateway
//! ```

use std::net::SocketAddr;

use clap::Parser;
use streamswitch::bridge::{Gateway, GatewayConfig};
use streamswitch::client::ClientConfig;

#[derive(Debug, Parser)]
#[command(name = "streamswitch-gateway", version, about = "WebSocket bridge for sensor readings")]
struct Args {
    /// Streaming transport target as host:port (falls back to STREAMSWITCH_TARGET)
    #[arg(long)]
    target: Option<String>,

    /// Address to listen on (defaults to 0.0.0.0 and PORT or 8080)
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    streamswitch::logging::init()?;

    let mut config = GatewayConfig::from_env()
        .client(ClientConfig::from_flag_or_env(args.target.as_deref()));
    if let Some(bind) = args.bind {
        config = config.bind(bind);
    }

    tracing::info!(target_addr = %config.client.target, "Bridging to telemetry server");

    Gateway::from_config(&config)
        .run_until(&config, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
