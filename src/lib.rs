//! Selective-Repeat ARQ engine over a simulated lossy channel.

#![forbid(unsafe_code, unused_must_use)]
#![warn(clippy::all, missing_docs)]

/// Protocol constants and per-scenario channel configuration.
pub mod common;

/// Frame layout and CRC-16/CCITT codec.
pub mod frame;

/// Unreliable channel simulator.
pub mod channel;

/// Selective Repeat sender state machine.
pub mod sender;

/// Selective Repeat receiver state machine.
pub mod receiver;

/// Counter bundle and end-of-run report.
pub mod stats;

/// Structured log event vocabulary.
pub mod log;

/// Built-in scenario table.
pub mod scenario;

/// Crate error taxonomy.
pub mod error;

/// Per-run orchestration.
pub mod run;

pub use error::ConfigError;
pub use frame::Frame;
pub use scenario::ScenarioConfig;
pub use stats::Stats;
