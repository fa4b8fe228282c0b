//! The Selective Repeat sender state machine (§4.4).

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::channel::Channel;
use crate::common::{FILL_YIELD_MS, MAX_PAYLOAD, MOD, W};
use crate::frame::Frame;
use crate::log;
use crate::stats::Counters;

/// A boxed, one-shot delivery handle: the capability to hand a frame to the
/// peer's inbound path. See the design note in `SPEC_FULL.md` §9.
pub type DeliverFn = Arc<dyn Fn(Frame) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

struct SenderState {
    /// Oldest unacknowledged sequence.
    base: u8,
    /// Next sequence number to assign.
    next_seq: u8,
    /// Sequence -> pending frame, size <= W.
    window: HashMap<u8, Frame>,
    /// Sequence -> live timer task handle. `dom(timers) ⊆ dom(window)`.
    timers: HashMap<u8, JoinHandle<()>>,
}

impl SenderState {
    fn free_slots(&self) -> u8 {
        W - ((self.next_seq + MOD - self.base) % MOD)
    }
}

/// Selective Repeat sender.
///
/// `base`, `next_seq`, `window` and `timers` are shared between the fill
/// loop, the ACK-delivery path, and timer tasks, and are serialized under a
/// single sender-scope mutex (§5).
pub struct Sender {
    state: Mutex<SenderState>,
    channel: Channel,
    /// Delivers a DATA frame to the receiver's inbound path.
    forward: DeliverFn,
    timeout_ms: u64,
    stats: Arc<Counters>,
}

impl Sender {
    /// Builds a sender bound to `channel` for its DATA path, delivering
    /// frames to the peer via `forward`.
    pub fn new(channel: Channel, timeout_ms: u64, forward: DeliverFn, stats: Arc<Counters>) -> Self {
        Self {
            state: Mutex::new(SenderState {
                base: 0,
                next_seq: 0,
                window: HashMap::new(),
                timers: HashMap::new(),
            }),
            channel,
            forward,
            timeout_ms,
            stats,
        }
    }

    /// Segments `message` and drives the send to completion.
    ///
    /// Returns `true` if every chunk was sent and acknowledged before
    /// `max_duration` elapsed, `false` if the wall-clock deadline fired
    /// with frames still outstanding.
    pub async fn send(self: &Arc<Self>, message: &[u8], max_duration: Duration) -> bool {
        let chunks: Vec<&[u8]> = if message.is_empty() {
            Vec::new()
        } else {
            message.chunks(MAX_PAYLOAD).collect()
        };

        let start = Instant::now();
        let mut off = 0usize;

        loop {
            let window_empty = self.state.lock().await.window.is_empty();
            if off == chunks.len() && window_empty {
                return true;
            }
            if start.elapsed() > max_duration {
                log::sys(format!(
                    "Durée limite {} ms atteinte — arrêt du protocole.",
                    max_duration.as_millis()
                ));
                return false;
            }

            while off < chunks.len() {
                let frame = {
                    let mut state = self.state.lock().await;
                    if state.free_slots() == 0 {
                        None
                    } else {
                        let seq = state.next_seq;
                        let acknum = if !state.window.is_empty() {
                            (state.base + MOD - 1) % MOD
                        } else {
                            (state.next_seq + MOD - 1) % MOD
                        };
                        let frame = Frame::data(seq, acknum, chunks[off].to_vec());
                        state.window.insert(seq, frame.clone());
                        state.next_seq = (state.next_seq + 1) % MOD;
                        Some(frame)
                    }
                };

                match frame {
                    Some(frame) => {
                        self.stats.frames_sent.fetch_add(1, Ordering::Relaxed);
                        self.send_with_timer(frame).await;
                        off += 1;
                    }
                    None => break,
                }
            }

            tokio::time::sleep(Duration::from_millis(FILL_YIELD_MS)).await;
        }
    }

    /// Transmits `frame` and (re)arms its retransmission timer.
    async fn send_with_timer(self: &Arc<Self>, frame: Frame) {
        log::envoi(&frame, self.timeout_ms);

        let forward = Arc::clone(&self.forward);
        self.channel.transmit(frame.clone(), move |f| forward(f));

        let seq = frame.seq;
        let me = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(me.timeout_ms)).await;
            me.on_timeout(seq).await;
        });

        let mut state = self.state.lock().await;
        if let Some(old) = state.timers.insert(seq, handle) {
            old.abort();
        }
    }

    /// Runs on a timer task when `seq`'s retransmission timer fires.
    ///
    /// Re-checks window membership under the lock: an ACK racing the timer
    /// may have already removed `seq`, in which case this is a no-op.
    async fn on_timeout(self: &Arc<Self>, seq: u8) {
        let frame = {
            let state = self.state.lock().await;
            state.window.get(&seq).cloned()
        };

        let Some(frame) = frame else {
            return;
        };

        log::timeout(seq);
        self.stats.frames_retransmitted.fetch_add(1, Ordering::Relaxed);
        log::retransmission(seq);
        self.send_with_timer(frame).await;
    }

    /// Processes an inbound ACK, sliding `base` cumulatively.
    pub async fn on_ack(self: &Arc<Self>, frame: Frame) {
        if !frame.is_ack {
            return;
        }

        self.stats.acks_received.fetch_add(1, Ordering::Relaxed);
        log::ack_recu(frame.acknum);

        let a = frame.acknum;
        let mut state = self.state.lock().await;
        while state.base != (a + 1) % MOD && !state.window.is_empty() {
            if let Some(timer) = state.timers.remove(&state.base) {
                timer.abort();
            }
            state.window.remove(&state.base);
            state.base = (state.base + 1) % MOD;
        }
    }
}
