//! Reading simulator
//!
//! Publishes one reading per interval for a randomly chosen sensor, with
//! values drawn uniformly from a configured range.

use std::future::Future;
use std::ops::Range;
use std::time::Duration;

use rand::Rng;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::client::TelemetryClient;
use crate::error::Result;
use crate::proto::{unix_nanos, Ack, Reading};

/// Simulator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Number of simulated sensors (minimum 1)
    pub sensors: usize,

    /// Time between readings
    pub interval: Duration,

    /// Readings to publish before stopping (`None` = until shutdown)
    pub count: Option<u64>,

    /// Range reading values are drawn from
    pub values: Range<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sensors: 3,
            interval: Duration::from_millis(50),
            count: None,
            values: 20.0..30.0,
        }
    }
}

impl SimConfig {
    /// Set the number of sensors
    pub fn sensors(mut self, sensors: usize) -> Self {
        self.sensors = sensors.max(1);
        self
    }

    /// Set the publish interval (minimum 1ms)
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Stop after `count` readings
    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the value range
    pub fn values(mut self, values: Range<f64>) -> Self {
        self.values = values;
        self
    }
}

/// Generates and publishes simulated readings
#[derive(Debug)]
pub struct Simulator {
    config: SimConfig,
    sensor_ids: Vec<String>,
    seq: u64,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Self {
        let sensor_ids = (0..config.sensors.max(1)).map(|_| sensor_id()).collect();
        Self {
            config,
            sensor_ids,
            seq: 0,
        }
    }

    /// Generated sensor ids
    pub fn sensor_ids(&self) -> &[String] {
        &self.sensor_ids
    }

    /// Produce the next reading; seq starts at 1
    pub fn next_reading(&mut self) -> Reading {
        self.seq += 1;

        let mut rng = rand::rng();
        let sensor = &self.sensor_ids[rng.random_range(0..self.sensor_ids.len())];
        let value = if self.config.values.is_empty() {
            self.config.values.start
        } else {
            rng.random_range(self.config.values.clone())
        };

        Reading::new(sensor.as_str(), unix_nanos(), value, self.seq)
    }

    /// Publish until the configured count is reached or `shutdown` resolves
    ///
    /// The publish call is closed either way and its ack returned.
    pub async fn run<F>(mut self, client: &TelemetryClient, shutdown: F) -> Result<Ack>
    where
        F: Future<Output = ()>,
    {
        let mut publisher = client.publish().await?;

        tracing::info!(
            target_addr = %client.config().target,
            sensors = ?self.sensor_ids,
            interval_ms = self.config.interval.as_millis() as u64,
            "Simulator publishing"
        );

        let mut tick = tokio::time::interval(self.config.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            if self.config.count.is_some_and(|count| self.seq >= count) {
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tick.tick() => {
                    let reading = self.next_reading();
                    tracing::trace!(sensor_id = %reading.sensor_id, seq = reading.seq, "Publishing reading");
                    publisher.send(reading).await?;
                }
            }
        }

        let ack = publisher.finish().await?;
        tracing::info!(sent = self.seq, last_seq = ack.last_seq, "Simulator stopped");
        Ok(ack)
    }
}

/// `sensor-` followed by 8 hex characters
fn sensor_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("sensor-{}", &id[..8])
}
