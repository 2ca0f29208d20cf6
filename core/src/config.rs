//! Simulation configuration.
//!
//! Loaded once from a bundled JSON file at service construction and
//! read-only for the lifetime of a run. Conversion rates, value pools,
//! and randomness knobs are all data — new metrics and experiments are
//! added here, not in code.

use crate::{
    error::{SimError, SimResult},
    profile::Country,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One experiment: the flag it varies on, the outcome metrics it owns,
/// and the per-metric, per-region base conversion rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub flag: String,
    pub outcome_metrics: Vec<String>,
    pub conversion_rates: HashMap<String, HashMap<String, f64>>,
    /// Base-rate multiplier for the trial-signup metric, keyed by the
    /// evaluated trial length in days. Missing entries multiply by 1.0.
    #[serde(default)]
    pub trial_duration_multiplier: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPools {
    pub countries: Vec<Country>,
    pub pet_types: Vec<String>,
    pub plan_types: Vec<String>,
    pub payment_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomnessConfig {
    /// Additive uniform noise applied to every conversion rate,
    /// drawn from [-noise_level, +noise_level].
    pub noise_level: f64,
    /// Spread warehouse event timestamps backwards over the last few
    /// minutes instead of stamping everything "now".
    pub time_variation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Run length in seconds. One batch tick per second.
    pub duration_secs: u64,
    pub records_per_second: u32,
    /// BTreeMap so experiment iteration order is stable.
    pub experiments: BTreeMap<String, ExperimentConfig>,
    pub user_generation: UserPools,
    pub randomness: RandomnessConfig,
    /// Monthly price by plan type, then region. The total_revenue event
    /// carries this amount when the profile's plan and region match.
    #[serde(default)]
    pub revenue: HashMap<String, HashMap<String, f64>>,
}

impl SimConfig {
    /// Load from a JSON file on disk.
    pub fn load(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The config bundled into the binary — data/simulation.json.
    pub fn bundled() -> SimResult<Self> {
        let config: SimConfig =
            serde_json::from_str(include_str!("../../data/simulation.json"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.duration_secs == 0 {
            return Err(SimError::InvalidConfig("duration_secs must be > 0".into()));
        }
        if self.records_per_second == 0 {
            return Err(SimError::InvalidConfig(
                "records_per_second must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.randomness.noise_level) {
            return Err(SimError::InvalidConfig(format!(
                "noise_level {} outside [0, 1]",
                self.randomness.noise_level
            )));
        }
        let pools = &self.user_generation;
        if pools.countries.is_empty()
            || pools.pet_types.is_empty()
            || pools.plan_types.is_empty()
            || pools.payment_types.is_empty()
        {
            return Err(SimError::InvalidConfig(
                "user_generation pools must be non-empty".into(),
            ));
        }
        Ok(())
    }

    /// Exact number of journeys a full run processes.
    pub fn total_records(&self) -> u64 {
        self.duration_secs * self.records_per_second as u64
    }
}
