//! The Selective Repeat receiver state machine (§4.3).

use tokio::sync::Mutex;

use crate::common::{MOD, W};
use crate::frame::Frame;
use crate::log;

struct State {
    /// Next in-order sequence expected.
    expected: u8,
    /// Sparse window buffer; `buf[i]` holds the frame with `seq = (expected + i) % MOD`.
    buf: Vec<Option<Frame>>,
    /// Payload bytes delivered so far, in order.
    rebuilt: Vec<u8>,
}

/// Selective Repeat receiver.
///
/// Stateless between frames except for `expected`, `buf`, and `rebuilt`, all
/// serialized under a single receiver-scope lock per §5.
pub struct Receiver {
    state: Mutex<State>,
}

impl Default for Receiver {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                expected: 0,
                buf: vec![None; W as usize],
                rebuilt: Vec::new(),
            }),
        }
    }
}

impl Receiver {
    /// Creates a fresh receiver with `expected = 0` and an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes an inbound frame.
    ///
    /// Returns `Some(ack)` when a cumulative ACK must be transmitted (every
    /// accepted DATA frame, including duplicates and frames that don't
    /// advance the prefix); `None` when the frame is ignored (an ACK frame,
    /// a CRC failure, or a frame outside the window).
    pub async fn on_data(&self, frame: Frame) -> Option<Frame> {
        if frame.is_ack {
            return None;
        }

        let crc_ok = frame.verify_crc();
        log::reception(&frame, crc_ok);
        if !crc_ok {
            return None;
        }

        let seq = frame.seq;
        let mut state = self.state.lock().await;

        let off = (seq + MOD - state.expected) % MOD;
        if off >= W {
            // Stale or far-ahead retransmission; the original ACK was
            // presumably lost. Re-ACKing is allowed but not required.
            return None;
        }

        let idx = off as usize;
        if state.buf[idx].is_none() {
            state.buf[idx] = Some(frame);
        }
        // else: slot already occupied, duplicate silently dropped.

        while state.buf[0].is_some() {
            let delivered = state.buf[0].take().unwrap();
            state.rebuilt.extend_from_slice(&delivered.payload);

            for i in 0..(W as usize - 1) {
                state.buf[i] = state.buf[i + 1].take();
            }
            let last = W as usize - 1;
            state.buf[last] = None;

            state.expected = (state.expected + 1) % MOD;
        }

        let acknum = (state.expected + MOD - 1) % MOD;
        let ack = Frame::ack(acknum);
        log::ack_emit(&ack);
        Some(ack)
    }

    /// The bytes delivered to the application so far, in order.
    pub async fn rebuilt(&self) -> Vec<u8> {
        self.state.lock().await.rebuilt.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[test_log::test]
    async fn in_order_frame_is_delivered_and_acked() {
        let rx = Receiver::new();
        let ack = rx.on_data(Frame::data(0, 0, b"abc".to_vec())).await;
        assert!(ack.is_some());
        assert_eq!(ack.unwrap().acknum, 0);
        assert_eq!(rx.rebuilt().await, b"abc");
    }

    #[tokio::test]
    #[test_log::test]
    async fn out_of_order_frame_is_buffered_then_flushed_on_gap_fill() {
        let rx = Receiver::new();

        let ack1 = rx.on_data(Frame::data(1, 0, b"B".to_vec())).await;
        assert_eq!(ack1.unwrap().acknum, (0u8.wrapping_sub(1)) % MOD);
        assert!(rx.rebuilt().await.is_empty());

        let ack0 = rx.on_data(Frame::data(0, 0, b"A".to_vec())).await;
        assert_eq!(ack0.unwrap().acknum, 1);
        assert_eq!(rx.rebuilt().await, b"AB");
    }

    #[tokio::test]
    #[test_log::test]
    async fn corrupt_frame_is_never_acked_or_buffered() {
        let rx = Receiver::new();
        let mut frame = Frame::data(0, 0, b"hello".to_vec());
        frame.payload[0] = frame.payload[0].wrapping_add(1);

        let ack = rx.on_data(frame).await;
        assert!(ack.is_none());
        assert!(rx.rebuilt().await.is_empty());
    }

    #[tokio::test]
    #[test_log::test]
    async fn corrupt_frame_then_clean_retransmission_acks_the_second() {
        let rx = Receiver::new();

        let mut corrupt = Frame::data(0, 0, b"hello".to_vec());
        corrupt.payload[0] = corrupt.payload[0].wrapping_add(1);
        assert!(rx.on_data(corrupt).await.is_none());

        let clean = Frame::data(0, 0, b"hello".to_vec());
        let ack = rx.on_data(clean).await.expect("clean retransmission is acked");
        assert_eq!(ack.acknum, 0);
    }

    #[tokio::test]
    #[test_log::test]
    async fn duplicate_in_window_frame_is_idempotent() {
        let rx = Receiver::new();
        rx.on_data(Frame::data(0, 0, b"A".to_vec())).await;
        let before = rx.rebuilt().await;

        rx.on_data(Frame::data(1, 0, b"B".to_vec())).await;
        let ack = rx.on_data(Frame::data(1, 0, b"B".to_vec())).await;
        assert!(ack.is_some());
        assert_eq!(rx.rebuilt().await, before.iter().chain(b"B").copied().collect::<Vec<_>>());
    }

    #[tokio::test]
    #[test_log::test]
    async fn frame_far_outside_window_is_dropped_silently() {
        let rx = Receiver::new();
        // expected = 0, W = 4: seq = 5 has off = 5, outside [0, W).
        let ack = rx.on_data(Frame::data(5, 0, b"x".to_vec())).await;
        assert!(ack.is_none());
        assert!(rx.rebuilt().await.is_empty());
    }

    #[tokio::test]
    #[test_log::test]
    async fn ack_frame_is_ignored() {
        let rx = Receiver::new();
        let ack = rx.on_data(Frame::ack(3)).await;
        assert!(ack.is_none());
    }

    #[tokio::test]
    #[test_log::test]
    async fn sequence_wrap_is_delivered_in_order() {
        let rx = Receiver::new();
        for seq in 0..10u8 {
            let payload = vec![seq; 1];
            let ack = rx.on_data(Frame::data(seq % MOD, 0, payload)).await;
            assert!(ack.is_some());
        }
        let expected: Vec<u8> = (0..10u8).collect();
        assert_eq!(rx.rebuilt().await, expected);
    }
}
