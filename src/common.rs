/// Sequence-number space size; seq/acknum arithmetic is modulo this.
pub static MOD: u8 = 8;

/// Selective Repeat window size. Constraint: `W < MOD`.
pub static W: u8 = 4;

/// Maximum DATA payload size, in bytes. Larger messages are segmented.
pub static MAX_PAYLOAD: usize = 100;

/// Base retransmission timeout, in milliseconds.
///
/// Per-scenario effective timeouts are derived from this in
/// [`crate::scenario`] and must exceed `2 * delai_max + margin`.
pub static TIMEOUT_MS: u64 = 260;

/// Hard wall-clock bound on a single send, in milliseconds.
///
/// A pragmatic bail-out, not a protocol property; exposed as a parameter on
/// [`crate::run::run`] rather than hard-coded.
pub static MAX_DURATION_MS: u64 = 10_000;

/// Interval the sender's fill loop yields between fill passes.
pub static FILL_YIELD_MS: u64 = 2;
