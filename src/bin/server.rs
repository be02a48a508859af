//! Hub plus streaming transport
//!
//! ```text
//! streamswitch-server --bind 0.0.0.0:50051
//! ```

use std::net::SocketAddr;

use clap::Parser;
use streamswitch::hub::HubConfig;
use streamswitch::server::{ServerConfig, TelemetryServer};

#[derive(Debug, Parser)]
#[command(name = "streamswitch-server", version, about = "Sensor reading fan-out server")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "STREAMSWITCH_BIND", default_value = "0.0.0.0:50051")]
    bind: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_connections: usize,

    /// Capacity of each subscriber queue
    #[arg(long, default_value_t = 1024)]
    queue_capacity: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    streamswitch::logging::init()?;

    let config = ServerConfig {
        bind_addr: args.bind,
        max_connections: args.max_connections,
        hub: HubConfig::default().queue_capacity(args.queue_capacity),
        ..ServerConfig::default()
    };

    let server = TelemetryServer::new(config);
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let stats = server.hub().stats();
    tracing::info!(
        broadcasts = stats.broadcasts,
        registrations = stats.registrations,
        "Server stopped"
    );
    Ok(())
}
