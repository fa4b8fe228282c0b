//! Per-run orchestration: wires a fresh `{Channel, Sender, Receiver, Stats}`
//! triad and drives one message across it.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crate::channel::Channel;
use crate::common::{MAX_DURATION_MS, MOD, W};
use crate::error::ConfigError;
use crate::frame::Frame;
use crate::log;
use crate::receiver::Receiver;
use crate::scenario::ScenarioConfig;
use crate::sender::{DeliverFn, Sender};
use crate::stats::{Counters, Stats};

/// Runs the protocol for a single message under `scenario`.
///
/// Builds a fresh sender/receiver/channel/stats bundle, so no state survives
/// across calls, drives the send to completion or until `max_duration`
/// elapses, and returns the final stats bundle alongside the bytes the
/// receiver actually reconstructed.
pub async fn run(message: &[u8], scenario: ScenarioConfig, max_duration: Duration) -> Result<(Stats, Vec<u8>), ConfigError> {
    scenario.validate()?;

    let channel = Channel::new(scenario.prob_erreur, scenario.prob_perte, scenario.delai_max)?;
    let receiver = Arc::new(Receiver::new());
    let counters = Arc::new(Counters::new());
    let timeout_ms = scenario.timeout_ms();

    let sender = Arc::new_cyclic(|weak: &Weak<Sender>| {
        let forward = forward_to_receiver(Arc::clone(&receiver), weak.clone(), channel);
        Sender::new(channel, timeout_ms, forward, Arc::clone(&counters))
    });

    log::sys(format!(
        "{} | message={} octets | timeout={} ms | W={} | MOD={} | target={}-{}",
        scenario.name,
        message.len(),
        timeout_ms,
        W,
        MOD,
        std::env::consts::OS,
        std::env::consts::ARCH,
    ));

    let start = Instant::now();
    let completed = sender.send(message, max_duration).await;
    let duration = start.elapsed();

    let rebuilt = receiver.rebuilt().await;
    let (frames_sent, frames_retransmitted, acks_received) = counters.snapshot();
    let integrity_ok = completed && rebuilt == message;

    Ok((
        Stats {
            frames_sent,
            frames_retransmitted,
            acks_received,
            duration,
            integrity_ok,
        },
        rebuilt,
    ))
}

/// The default hard wall-clock bound on a single send.
pub fn default_max_duration() -> Duration {
    Duration::from_millis(MAX_DURATION_MS)
}

/// Builds the DATA-path delivery handle: feeds the receiver, then routes
/// any resulting ACK back through the same channel into the sender.
fn forward_to_receiver(receiver: Arc<Receiver>, sender: Weak<Sender>, channel: Channel) -> DeliverFn {
    Arc::new(move |frame: Frame| {
        let receiver = Arc::clone(&receiver);
        let sender = sender.clone();
        Box::pin(async move {
            if let Some(ack) = receiver.on_data(frame).await {
                if let Some(sender) = sender.upgrade() {
                    channel.transmit(ack, move |a| {
                        let sender = Arc::clone(&sender);
                        async move { sender.on_ack(a).await }
                    });
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[test_log::test]
    async fn perfect_channel_short_message() {
        let scenario = ScenarioConfig::lookup(1).unwrap();
        let (stats, rebuilt) = run(b"ABC", scenario, default_max_duration()).await.unwrap();

        assert_eq!(stats.frames_sent, 1);
        assert_eq!(stats.frames_retransmitted, 0);
        assert!(stats.acks_received >= 1);
        assert_eq!(rebuilt, b"ABC");
        assert!(stats.integrity_ok);
        assert!(stats.duration < Duration::from_secs(1));
    }

    #[tokio::test]
    #[test_log::test]
    async fn perfect_channel_sequence_wrap() {
        let scenario = ScenarioConfig::lookup(1).unwrap();
        let mut message = Vec::new();
        for letter in b'A'..=b'J' {
            message.extend(std::iter::repeat(letter).take(100));
        }

        let (stats, rebuilt) = run(&message, scenario, default_max_duration()).await.unwrap();

        assert_eq!(stats.frames_sent, 10);
        assert_eq!(stats.frames_retransmitted, 0);
        assert_eq!(rebuilt, message);
        assert!(stats.integrity_ok);
    }

    #[tokio::test]
    #[test_log::test]
    async fn lossy_channel_eventually_delivers() {
        let scenario = ScenarioConfig::lookup(2).unwrap();
        let message = b"Hello, SR!".repeat(30);

        let (stats, rebuilt) = run(&message, scenario, Duration::from_secs(10)).await.unwrap();

        assert_eq!(rebuilt, message);
        assert!(stats.integrity_ok);
    }

    #[tokio::test]
    #[test_log::test]
    async fn unstable_channel_completes_within_deadline_or_reports_failure_honestly() {
        let scenario = ScenarioConfig::lookup(3).unwrap();
        let message = b"Hello, SR!".repeat(30);

        let (stats, rebuilt) = run(&message, scenario, Duration::from_secs(10)).await.unwrap();

        // Either it finished within the deadline (and integrity holds), or
        // the 10s bail-out fired, but never an infinite loop, and the
        // verdict must never claim OK on a mismatched reconstruction.
        assert_eq!(stats.integrity_ok, rebuilt == message);
    }

    #[tokio::test]
    #[test_log::test]
    async fn empty_message_completes_immediately() {
        let scenario = ScenarioConfig::lookup(1).unwrap();
        let (stats, rebuilt) = run(b"", scenario, default_max_duration()).await.unwrap();

        assert_eq!(stats.frames_sent, 0);
        assert!(rebuilt.is_empty());
        assert!(stats.integrity_ok);
    }

    #[tokio::test]
    #[test_log::test]
    async fn max_payload_boundary_is_one_frame() {
        let scenario = ScenarioConfig::lookup(1).unwrap();
        let message = vec![b'x'; crate::common::MAX_PAYLOAD];
        let (stats, rebuilt) = run(&message, scenario, default_max_duration()).await.unwrap();

        assert_eq!(stats.frames_sent, 1);
        assert_eq!(rebuilt, message);
    }

    #[tokio::test]
    #[test_log::test]
    async fn max_payload_plus_one_splits_into_two_frames() {
        let scenario = ScenarioConfig::lookup(1).unwrap();
        let message = vec![b'x'; crate::common::MAX_PAYLOAD + 1];
        let (stats, rebuilt) = run(&message, scenario, default_max_duration()).await.unwrap();

        assert_eq!(stats.frames_sent, 2);
        assert_eq!(rebuilt, message);
    }
}
