//! The unreliable channel simulator (§4.1).
//!
//! Each [`Channel::transmit`] call schedules a single, independent delivery
//! on its own task, with no shared pending-delivery queue. FIFO ordering
//! across transmissions is therefore a statistical property of the delay
//! distribution, not a guarantee; receivers and senders must tolerate
//! reordering within their windows, as the rest of this crate does.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;
use crate::frame::Frame;
use crate::log;

/// Channel configuration: corruption probability, loss probability, and
/// the maximum per-frame delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    prob_erreur: f64,
    prob_perte: f64,
    delai_max: u64,
}

impl Channel {
    /// Builds a channel, rejecting out-of-range probabilities.
    pub fn new(prob_erreur: f64, prob_perte: f64, delai_max: u64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&prob_erreur) {
            return Err(ConfigError::InvalidProbability("probErreur", prob_erreur));
        }
        if !(0.0..=1.0).contains(&prob_perte) {
            return Err(ConfigError::InvalidProbability("probPerte", prob_perte));
        }
        Ok(Self {
            prob_erreur,
            prob_perte,
            delai_max,
        })
    }

    /// Schedules a single eventual invocation of `deliver_cb(frame)`, unless
    /// the frame is dropped.
    ///
    /// Draws one uniform `u`: `u < probPerte` drops silently; the next band
    /// corrupts exactly one payload byte (CRC left stale); a uniform delay
    /// in `[0, delaiMax]` ms is applied either way before delivery.
    pub fn transmit<F, Fut>(&self, mut frame: Frame, deliver_cb: F)
    where
        F: FnOnce(Frame) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let prob_perte = self.prob_perte;
        let prob_erreur = self.prob_erreur;
        let delai_max = self.delai_max;

        tokio::spawn(async move {
            let mut rng = rand::rng();
            let u: f64 = rng.random();

            if u < prob_perte {
                log::trame_perdue(&frame);
                return;
            }

            if u < prob_perte + prob_erreur {
                corrupt_one_byte(&mut frame, &mut rng);
                log::trame_corrompue(&frame);
            }

            let delay = if delai_max > 0 {
                rng.random_range(0..=delai_max)
            } else {
                0
            };
            log::transmission(&frame, delay);

            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            log::trame_livree(&frame);
            deliver_cb(frame).await;
        });
    }
}

/// Alters exactly one payload byte by incrementing it modulo 256. The CRC
/// is deliberately left untouched, so `verify_crc` detects the corruption.
fn corrupt_one_byte(frame: &mut Frame, rng: &mut impl Rng) {
    if frame.payload.is_empty() {
        return;
    }
    let pos = rng.random_range(0..frame.payload.len());
    frame.payload[pos] = frame.payload[pos].wrapping_add(1);
}
