//! Planner configuration.

use std::time::Duration;

use serde::Deserialize;

use super::error::PlannerError;
use crate::search::frontier::DEFAULT_MAX_ITERATIONS;

/// Seed used when the caller does not pick one.
const DEFAULT_SEED: u64 = 0x5eed_e4a9;

/// Tunables for one planner invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Overall wall-clock budget in milliseconds. `None` disables
    /// time-boxing entirely.
    pub time_limit_ms: Option<u64>,
    /// The spawn is hemmed in; use the small-launch menu.
    pub cramped: bool,
    /// Try menu entries in random order with an even time split.
    pub shuffle: bool,
    /// Retry the first launch of each candidate with a few of its early
    /// tiles blocked.
    pub diversify: bool,
    /// Internal-consistency failures become errors instead of log lines.
    pub debug_asserts: bool,
    /// Trace every replayed turn.
    pub log_moves: bool,
    /// Seed for shuffling and diversification (0 = entropy).
    pub seed: u64,
    /// Frontier pops allowed per launch search.
    pub segment_iteration_limit: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            time_limit_ms: Some(100),
            cramped: false,
            shuffle: false,
            diversify: true,
            debug_asserts: false,
            log_moves: false,
            seed: DEFAULT_SEED,
            segment_iteration_limit: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl PlannerConfig {
    /// A deterministic configuration with no time limit and debug assertions
    /// on.
    pub fn exhaustive() -> Self {
        PlannerConfig {
            time_limit_ms: None,
            debug_asserts: true,
            ..PlannerConfig::default()
        }
    }

    /// Parses a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PlannerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}
