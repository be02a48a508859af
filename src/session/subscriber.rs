//! Subscriber delivery session
//!
//! Registers one queue with the hub, then relays what arrives on it to a
//! [`DeliverySink`], applying rate decimation, until the downstream fails or
//! the session is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::hub::{Hub, Registration, TopicKey};
use crate::proto::{unix_nanos, ReadingWithMeta, Subscription};
use crate::stats::SessionStats;

use super::decimator::Decimator;
use super::sink::DeliverySink;

/// One subscriber connection's delivery loop
///
/// Registrations are made in [`open`](Self::open) and held by the session;
/// they are released when the session ends or is dropped, whichever happens
/// first.
pub struct SubscriberSession {
    session_id: u64,
    subscription: Subscription,
    registrations: Vec<Registration>,
    rx: mpsc::Receiver<ReadingWithMeta>,
    decimator: Decimator,
    tick_interval: Duration,
    cancel: CancellationToken,
}

impl SubscriberSession {
    /// Validate the subscription and register with the hub
    ///
    /// An empty sensor list registers once under the wildcard topic;
    /// otherwise once per listed id, all sharing one queue. Once this
    /// returns, every later broadcast matching the subscription reaches the
    /// session's queue.
    pub fn open(
        session_id: u64,
        hub: &Arc<Hub>,
        subscription: Subscription,
        cancel: CancellationToken,
    ) -> Result<Self> {
        subscription.validate()?;

        let (queue, rx) = hub.queue();
        let topics = TopicKey::for_subscription(&subscription);
        let mut registrations = Vec::with_capacity(topics.len());
        for topic in topics {
            registrations.push(hub.register(topic, &queue));
        }

        tracing::info!(
            session_id = session_id,
            queue_id = queue.id(),
            topics = ?subscription.sensor_ids,
            sample_rate_hz = subscription.sample_rate_hz,
            "Subscriber session opened"
        );

        Ok(Self {
            session_id,
            decimator: Decimator::new(subscription.min_interval()),
            subscription,
            registrations,
            rx,
            tick_interval: hub.config().tick_interval,
            cancel,
        })
    }

    /// Session id
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Subscription this session serves
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Relay messages until the sink fails or the session is cancelled
    ///
    /// Wakes on the next queued message, the periodic tick or cancellation,
    /// whichever comes first. A tick alone never produces output. A sink
    /// error is returned; cancellation ends cleanly.
    pub async fn run<S: DeliverySink>(mut self, sink: &mut S) -> Result<SessionStats> {
        let started = Instant::now();
        let mut stats = SessionStats::new();
        let mut tick = tokio::time::interval(self.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let result = loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break Ok(()),

                msg = self.rx.recv() => {
                    let Some(mut msg) = msg else {
                        break Ok(());
                    };
                    if !self.decimator.admit(Instant::now()) {
                        stats.decimated += 1;
                        continue;
                    }
                    msg.meta.sent_ts = unix_nanos();

                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break Ok(()),
                        delivered = sink.deliver(msg) => {
                            if let Err(e) = delivered {
                                break Err(e);
                            }
                        }
                    }
                    stats.forwarded += 1;
                }

                _ = tick.tick() => {}
            }
        };

        self.release();
        stats.duration = started.elapsed();

        match &result {
            Ok(()) => tracing::info!(
                session_id = self.session_id,
                forwarded = stats.forwarded,
                decimated = stats.decimated,
                "Subscriber session closed"
            ),
            Err(e) => tracing::debug!(
                session_id = self.session_id,
                forwarded = stats.forwarded,
                error = %e,
                "Subscriber session ended by downstream failure"
            ),
        }

        result.map(|()| stats)
    }

    fn release(&mut self) {
        for registration in self.registrations.drain(..) {
            registration.release();
        }
    }
}
