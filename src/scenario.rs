//! Built-in channel scenarios and the derived-timeout rule.

use crate::common::TIMEOUT_MS;
use crate::error::ConfigError;

/// A named channel configuration plus its derived timeout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioConfig {
    /// Scenario selector, one of `{1, 2, 3}`.
    pub id: u8,
    /// Human-readable scenario name.
    pub name: &'static str,
    /// Per-frame corruption probability, in `[0, 1]`.
    pub prob_erreur: f64,
    /// Per-frame loss probability, in `[0, 1]`.
    pub prob_perte: f64,
    /// Maximum per-frame uniform delay, in milliseconds.
    pub delai_max: u64,
}

impl ScenarioConfig {
    /// Looks up a built-in scenario by its CLI selector.
    ///
    /// Returns [`ConfigError::UnknownScenario`] for anything outside
    /// `{1, 2, 3}`.
    pub fn lookup(id: u8) -> Result<Self, ConfigError> {
        SCENARIOS
            .iter()
            .copied()
            .find(|s| s.id == id)
            .ok_or(ConfigError::UnknownScenario(id))
    }

    /// The effective retransmission timeout for this scenario.
    ///
    /// `max(TIMEOUT_MS, 2 * delai_max + 100)`, so spurious retransmissions
    /// from an under-sized timeout never dominate a noisy/delayed channel.
    pub fn timeout_ms(&self) -> u64 {
        let rtt_based = 2 * self.delai_max + 100;
        TIMEOUT_MS.max(rtt_based)
    }

    /// Validates that probabilities lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.prob_erreur) {
            return Err(ConfigError::InvalidProbability("probErreur", self.prob_erreur));
        }
        if !(0.0..=1.0).contains(&self.prob_perte) {
            return Err(ConfigError::InvalidProbability("probPerte", self.prob_perte));
        }
        Ok(())
    }
}

static SCENARIOS: [ScenarioConfig; 3] = [
    ScenarioConfig {
        id: 1,
        name: "Canal parfait",
        prob_erreur: 0.0,
        prob_perte: 0.0,
        delai_max: 0,
    },
    ScenarioConfig {
        id: 2,
        name: "Canal bruité",
        prob_erreur: 0.05,
        prob_perte: 0.10,
        delai_max: 200,
    },
    ScenarioConfig {
        id: 3,
        name: "Canal instable",
        prob_erreur: 0.10,
        prob_perte: 0.15,
        delai_max: 300,
    },
];
