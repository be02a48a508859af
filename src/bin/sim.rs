//! Simulated sensor publisher
//!
//! ```text
//! streamswitch-sim --target localhost:50051 --sensors 3 --interval-ms 50
//! ```

use std::time::Duration;

use clap::Parser;
use streamswitch::client::{ClientConfig, TelemetryClient};
use streamswitch::sim::{SimConfig, Simulator};

#[derive(Debug, Parser)]
#[command(name = "streamswitch-sim", version, about = "Publish simulated sensor readings")]
struct Args {
    /// Streaming transport target as host:port (falls back to STREAMSWITCH_TARGET)
    #[arg(long)]
    target: Option<String>,

    /// Number of simulated sensors
    #[arg(long, default_value_t = 3)]
    sensors: usize,

    /// Milliseconds between readings
    #[arg(long, default_value_t = 50)]
    interval_ms: u64,

    /// Stop after this many readings
    #[arg(long)]
    count: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    streamswitch::logging::init()?;

    let mut config = SimConfig::default()
        .sensors(args.sensors)
        .interval(Duration::from_millis(args.interval_ms));
    if let Some(count) = args.count {
        config = config.count(count);
    }

    let client = TelemetryClient::new(ClientConfig::from_flag_or_env(args.target.as_deref()));
    let ack = Simulator::new(config)
        .run(&client, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!(last_seq = ack.last_seq, "Publish acknowledged");
    Ok(())
}
