//! Reading and subscription message types
//!
//! These are the units exchanged on both transports. Field names on the wire
//! carry their time unit (`*_unix_nano`) while the Rust names stay short.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current wall-clock time in nanoseconds since the Unix epoch
pub fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// One timestamped sensor measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Sensor identifier, also the fan-out topic
    pub sensor_id: String,
    /// Publisher timestamp (ns since epoch)
    #[serde(rename = "ts_unix_nano")]
    pub ts: i64,
    /// Measured value
    pub value: f64,
    /// Publisher sequence number
    pub seq: u64,
}

impl Reading {
    /// Create a new reading
    pub fn new(sensor_id: impl Into<String>, ts: i64, value: f64, seq: u64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            ts,
            value,
            seq,
        }
    }
}

/// Server-side timestamps attached to every delivered reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerMeta {
    /// When the hub accepted the reading
    #[serde(rename = "received_unix_nano")]
    pub received_ts: i64,
    /// When the subscriber session forwarded it
    #[serde(rename = "sent_unix_nano")]
    pub sent_ts: i64,
}

/// A reading plus its server metadata
///
/// The reading is shared behind an `Arc` so fan-out to many queues only
/// bumps a reference count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingWithMeta {
    pub reading: Arc<Reading>,
    pub meta: ServerMeta,
}

impl ReadingWithMeta {
    /// Wrap a reading with `received_ts = sent_ts = now`
    pub fn stamped(reading: Arc<Reading>, now: i64) -> Self {
        Self {
            reading,
            meta: ServerMeta {
                received_ts: now,
                sent_ts: now,
            },
        }
    }
}

/// Subscriber request: which sensors, and at what maximum rate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Subscription {
    /// Sensor ids to follow; empty means every sensor
    #[serde(default)]
    pub sensor_ids: Vec<String>,
    /// Maximum forwarding rate; 0 means unthrottled
    #[serde(default)]
    pub sample_rate_hz: f64,
}

impl Subscription {
    /// Subscription to every sensor, unthrottled
    pub fn all() -> Self {
        Self::default()
    }

    /// Subscription to the given sensors, unthrottled
    pub fn sensors<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sensor_ids: ids.into_iter().map(Into::into).collect(),
            sample_rate_hz: 0.0,
        }
    }

    /// Subscription built from an optional single-sensor filter
    ///
    /// `None` and the empty string both mean "all sensors".
    pub fn from_filter(filter: Option<&str>) -> Self {
        match filter {
            Some(id) if !id.is_empty() => Self::sensors([id]),
            _ => Self::all(),
        }
    }

    /// Set the maximum forwarding rate
    pub fn sample_rate(mut self, hz: f64) -> Self {
        self.sample_rate_hz = hz;
        self
    }

    /// Whether this subscription follows every sensor
    pub fn is_wildcard(&self) -> bool {
        self.sensor_ids.is_empty()
    }

    /// Check that the parameters are usable
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz < 0.0 {
            return Err(Error::InvalidSubscription(format!(
                "sample_rate_hz must be a finite value >= 0, got {}",
                self.sample_rate_hz
            )));
        }
        Ok(())
    }

    /// Minimum spacing between forwarded messages, if throttled
    pub fn min_interval(&self) -> Option<Duration> {
        if self.sample_rate_hz > 0.0 {
            Some(Duration::try_from_secs_f64(1.0 / self.sample_rate_hz).unwrap_or(Duration::MAX))
        } else {
            None
        }
    }
}

/// Terminal reply to a publish call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ack {
    /// Sequence number of the last reading received (not the maximum)
    pub last_seq: u64,
}

/// Bench reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pong {
    /// Echo of the request counter
    pub n: u64,
    /// Server time when the reply was built
    pub ts_unix_nano: i64,
}
