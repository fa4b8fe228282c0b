//! Structured log event vocabulary, built on `tracing`.
//!
//! Each function below emits exactly one of the required kinds from the
//! spec's "Outputs" table, carrying an `origin` field
//! (`TX`/`RX`/`CH`/`SYS`) and a `frame` field holding the frame's
//! `Display` representation. Timestamps are supplied by the `fmt` layer
//! installed in `main`, not formatted here.

use crate::frame::Frame;

/// TX: a DATA frame was handed to the channel (`ENVOI`).
pub fn envoi(frame: &Frame, timeout_ms: u64) {
    tracing::info!(origin = "TX", kind = "ENVOI", %frame, timeout_ms, "ENVOI");
}

/// RX: a frame arrived and was CRC-checked (`RECEPTION`).
pub fn reception(frame: &Frame, crc_ok: bool) {
    tracing::info!(origin = "RX", kind = "RECEPTION", %frame, crc_ok, "RECEPTION");
}

/// RX: an ACK was emitted in response to an accepted DATA frame (`ACK->`).
pub fn ack_emit(frame: &Frame) {
    tracing::info!(origin = "RX", kind = "ACK->", %frame, "ACK->");
}

/// TX: an ACK was received and processed (`ACK RECU`).
pub fn ack_recu(acknum: u8) {
    tracing::info!(origin = "TX", kind = "ACK RECU", acknum, "ACK RECU");
}

/// TX: a per-frame timer fired (`TIMEOUT`).
pub fn timeout(seq: u8) {
    tracing::warn!(origin = "TX", kind = "TIMEOUT", seq, "TIMEOUT");
}

/// TX: a timed-out frame was retransmitted (`RETRANSMISSION`).
pub fn retransmission(seq: u8) {
    tracing::warn!(origin = "TX", kind = "RETRANSMISSION", seq, "RETRANSMISSION");
}

/// CH: a frame was dropped by the channel (`Trame perdue`).
pub fn trame_perdue(frame: &Frame) {
    tracing::info!(origin = "CH", kind = "Trame perdue", %frame, "Trame perdue");
}

/// CH: a frame's payload was corrupted in transit (`Trame corrompue`).
pub fn trame_corrompue(frame: &Frame) {
    tracing::info!(origin = "CH", kind = "Trame corrompue", %frame, "Trame corrompue");
}

/// CH: a frame was scheduled for delivery after a delay (`Transmission (+d ms)`).
pub fn transmission(frame: &Frame, delay_ms: u64) {
    tracing::debug!(
        origin = "CH",
        kind = "Transmission (+d ms)",
        %frame,
        delay_ms,
        "Transmission (+{} ms)",
        delay_ms
    );
}

/// CH: a frame reached its destination callback (`Trame livrée`).
pub fn trame_livree(frame: &Frame) {
    tracing::debug!(origin = "CH", kind = "Trame livrée", %frame, "Trame livrée");
}

/// SYS: a free-form system event (run start/stop banners, deadline hit).
pub fn sys(message: impl std::fmt::Display) {
    tracing::info!(origin = "SYS", kind = "SYS", "{}", message);
}
