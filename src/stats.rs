//! Counter bundle and end-of-run report.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Atomic counters shared between the sender's fill loop, ACK-delivery task,
/// and timer tasks.
#[derive(Default)]
pub struct Counters {
    /// DATA frames handed to the channel, including retransmissions.
    pub frames_sent: AtomicU64,
    /// DATA frames retransmitted after a timer fired.
    pub frames_retransmitted: AtomicU64,
    /// ACK frames processed by the sender.
    pub acks_received: AtomicU64,
}

impl Counters {
    /// A fresh, zeroed counter bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads all three counters as a consistent-enough snapshot.
    ///
    /// Each field is read independently; under concurrent updates the triple
    /// is not atomic as a whole, matching the looseness of a plain stats
    /// dict updated from multiple tasks.
    pub fn snapshot(&self) -> (u64, u64, u64) {
        (
            self.frames_sent.load(Ordering::Relaxed),
            self.frames_retransmitted.load(Ordering::Relaxed),
            self.acks_received.load(Ordering::Relaxed),
        )
    }
}

/// The end-of-run stats bundle reported to callers (§6 "Stats bundle").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Total DATA frames sent, including retransmissions.
    pub frames_sent: u64,
    /// DATA frames retransmitted after a timeout.
    pub frames_retransmitted: u64,
    /// ACK frames received and processed.
    pub acks_received: u64,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Whether the reconstructed message equals the input bytes.
    pub integrity_ok: bool,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames envoyées : {}", self.frames_sent)?;
        writeln!(f, "Frames retransmises : {}", self.frames_retransmitted)?;
        writeln!(f, "ACK reçus : {}", self.acks_received)?;
        writeln!(f, "Durée totale : {:.3} s", self.duration.as_secs_f64())?;
        write!(
            f,
            "Intégrité message : {}",
            if self.integrity_ok { "OK" } else { "ECHEC" }
        )
    }
}
