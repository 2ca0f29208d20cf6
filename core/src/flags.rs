//! The flag-evaluation seam.
//!
//! RULE: The simulation never talks to a flag platform directly.
//! Everything goes through the constructor-injected FlagClient, so the
//! engine runs identically against a real platform adapter or the
//! bundled static client.

use crate::{
    error::{SimError, SimResult},
    profile::UserProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

pub type FlagValue = serde_json::Value;

// ── Flag keys ──────────────────────────────────────────────────
pub const FLAG_TRIAL_DAYS: &str = "number-of-days-trial";
pub const FLAG_SEASONAL_BANNER: &str = "seasonal-sale-banner-text";
pub const FLAG_HERO_BANNER: &str = "hero-banner-text";
pub const FLAG_OUTCOME_LOCATION: &str = "outcome-location";

pub const DEFAULT_TRIAL_DAYS: i64 = 7;

// Values of the outcome-location flag: forward fired events through the
// platform's track call, or insert them into the warehouse.
pub const OUTCOME_PLATFORM: &str = "platform";
pub const OUTCOME_WAREHOUSE: &str = "warehouse";

/// External flag-evaluation platform contract.
pub trait FlagClient: Send + Sync {
    /// Resolve a named flag for a user context, falling back to
    /// `default` when the platform has no value.
    fn evaluate(
        &self,
        key: &str,
        default: FlagValue,
        ctx: &UserProfile,
    ) -> SimResult<FlagValue>;

    /// Record an outcome event against a user context. `value` carries
    /// a monetary amount for revenue metrics, None otherwise.
    fn track(&self, event: &str, value: Option<f64>, ctx: &UserProfile) -> SimResult<()>;

    fn close(&self) {}
}

/// The three experiment flags evaluated once per journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedFlags {
    pub trial_days: i64,
    pub seasonal_banner: String,
    pub hero_banner: FlagValue,
}

impl EvaluatedFlags {
    pub fn evaluate(client: &dyn FlagClient, profile: &UserProfile) -> SimResult<Self> {
        let trial_days = client
            .evaluate(FLAG_TRIAL_DAYS, FlagValue::from(DEFAULT_TRIAL_DAYS), profile)?
            .as_i64()
            .unwrap_or(DEFAULT_TRIAL_DAYS);
        let seasonal_banner = client
            .evaluate(FLAG_SEASONAL_BANNER, FlagValue::from(""), profile)?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let hero_banner = client.evaluate(
            FLAG_HERO_BANNER,
            FlagValue::Object(Default::default()),
            profile,
        )?;
        Ok(Self {
            trial_days,
            seasonal_banner,
            hero_banner,
        })
    }

    /// Flag name / value pairs for results accumulation.
    pub fn as_pairs(&self) -> Vec<(&'static str, FlagValue)> {
        vec![
            (FLAG_TRIAL_DAYS, FlagValue::from(self.trial_days)),
            (FLAG_SEASONAL_BANNER, FlagValue::from(self.seasonal_banner.as_str())),
            (FLAG_HERO_BANNER, self.hero_banner.clone()),
        ]
    }
}

/// An event recorded through StaticFlagClient::track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub event: String,
    pub value: Option<f64>,
    pub context_key: String,
}

/// Offline flag client: fixed values from a map or JSON file, tracked
/// events kept in memory. Serves the headless runner and every test.
#[derive(Default)]
pub struct StaticFlagClient {
    values: HashMap<String, FlagValue>,
    tracked: Mutex<Vec<TrackedEvent>>,
}

impl StaticFlagClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load flag values from a JSON object file: {"flag-key": value, ...}.
    pub fn from_file(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let values: HashMap<String, FlagValue> = serde_json::from_str(&content)?;
        Ok(Self {
            values,
            tracked: Mutex::new(Vec::new()),
        })
    }

    pub fn with_value(mut self, key: &str, value: FlagValue) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    /// Snapshot of everything tracked so far.
    pub fn tracked(&self) -> Vec<TrackedEvent> {
        self.tracked
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

impl FlagClient for StaticFlagClient {
    fn evaluate(
        &self,
        key: &str,
        default: FlagValue,
        _ctx: &UserProfile,
    ) -> SimResult<FlagValue> {
        Ok(self.values.get(key).cloned().unwrap_or(default))
    }

    fn track(&self, event: &str, value: Option<f64>, ctx: &UserProfile) -> SimResult<()> {
        let mut tracked = self.tracked.lock().map_err(|_| SimError::FlagEvaluation {
            flag: event.to_string(),
            detail: "tracked-event log poisoned".to_string(),
        })?;
        tracked.push(TrackedEvent {
            event: event.to_string(),
            value,
            context_key: ctx.key.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{profile::Country, profile::ProfileGenerator, rng::SimRng};
    use crate::config::UserPools;

    fn any_profile() -> UserProfile {
        let pools = UserPools {
            countries: vec![Country::US],
            pet_types: vec!["dog".into()],
            plan_types: vec!["basic".into()],
            payment_types: vec!["paypal".into()],
        };
        ProfileGenerator::new(pools).generate(&mut SimRng::seeded(1))
    }

    #[test]
    fn static_client_falls_back_to_defaults() {
        let client = StaticFlagClient::new();
        let flags = EvaluatedFlags::evaluate(&client, &any_profile()).unwrap();
        assert_eq!(flags.trial_days, DEFAULT_TRIAL_DAYS);
        assert!(flags.seasonal_banner.is_empty());
    }

    #[test]
    fn static_client_returns_configured_values() {
        let client = StaticFlagClient::new()
            .with_value(FLAG_TRIAL_DAYS, FlagValue::from(14))
            .with_value(FLAG_SEASONAL_BANNER, FlagValue::from("Winter Sale"));
        let flags = EvaluatedFlags::evaluate(&client, &any_profile()).unwrap();
        assert_eq!(flags.trial_days, 14);
        assert_eq!(flags.seasonal_banner, "Winter Sale");
    }

    #[test]
    fn close_leaves_tracked_events_readable() {
        let client = StaticFlagClient::new();
        let profile = any_profile();
        client.track("trial_signup", None, &profile).unwrap();
        client.close();
        assert_eq!(client.tracked().len(), 1);
    }

    #[test]
    fn tracked_events_are_recorded_in_order() {
        let client = StaticFlagClient::new();
        let profile = any_profile();
        client.track("trial_signup", None, &profile).unwrap();
        client.track("total_revenue", Some(29.99), &profile).unwrap();

        let tracked = client.tracked();
        assert_eq!(tracked.len(), 2);
        assert_eq!(tracked[0].event, "trial_signup");
        assert_eq!(tracked[1].value, Some(29.99));
        assert_eq!(tracked[1].context_key, profile.key);
    }
}
