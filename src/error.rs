//! Configuration-time error taxonomy.
//!
//! Per spec, channel events (loss/corruption/delay) and protocol timeouts
//! are not errors: they are expected inputs, logged and resolved in place.
//! Only malformed configuration surfaces as a `Result`.

use thiserror::Error;

/// Errors rejected at construction time, before a run starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The scenario selector was outside `{1, 2, 3}`.
    #[error("unknown scenario {0} (expected 1, 2, or 3)")]
    UnknownScenario(u8),

    /// A channel probability fell outside `[0, 1]`.
    #[error("{0} must be in [0, 1], got {1}")]
    InvalidProbability(&'static str, f64),
}
