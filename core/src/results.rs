//! Run results and per-tick progress snapshots.
//!
//! Results accumulate monotonically across a run and are only ever
//! mutated from the engine's tick. BTreeMaps keep serialized snapshots
//! stable, so a persisted snapshot reloads to identical counts.

use crate::{flags::FlagValue, journey::JourneyOutcome, types::RecordIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub total_users: u64,
    /// event name → fire count.
    pub events: BTreeMap<String, u64>,
    /// flag name → stringified evaluated value → count.
    pub flag_evaluations: BTreeMap<String, BTreeMap<String, u64>>,
    /// Elapsed wall-clock milliseconds, stamped on completion.
    pub duration_ms: u64,
}

impl SimulationResults {
    pub fn record_journey(&mut self, outcome: &JourneyOutcome) {
        self.total_users += 1;
        for event in &outcome.events {
            *self.events.entry(event.clone()).or_default() += 1;
        }
        for (flag, value) in outcome.flags.as_pairs() {
            let by_value = self.flag_evaluations.entry(flag.to_string()).or_default();
            *by_value.entry(stringify_flag_value(&value)).or_default() += 1;
        }
    }

    /// A journey whose flag evaluation failed still consumes its record
    /// slot; it just contributes no events.
    pub fn record_skipped(&mut self) {
        self.total_users += 1;
    }

    pub fn event_count(&self, name: &str) -> u64 {
        self.events.get(name).copied().unwrap_or(0)
    }
}

/// Strings go in raw; everything else as compact JSON. Keeps "7" and
/// "Winter Sale" readable while objects stay unambiguous.
fn stringify_flag_value(value: &FlagValue) -> String {
    match value {
        FlagValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Snapshot emitted once per batch tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationProgress {
    pub current_record: RecordIndex,
    pub total_records: RecordIndex,
    pub percentage: f64,
    pub results: SimulationResults,
}
