//! Event decision engine.
//!
//! Every conditional event is one independent Bernoulli trial whose
//! probability comes from the config: base rate looked up by (metric,
//! region), scaled by the trial-duration multiplier where it applies,
//! perturbed by uniform noise, clamped to [0, 1].
//!
//! Each metric must be registered by exactly one experiment — duplicate
//! registration is rejected at construction so lookups are unambiguous.

use crate::{
    config::SimConfig,
    error::{SimError, SimResult},
    flags::EvaluatedFlags,
    profile::Country,
    rng::SimRng,
    types::METRIC_TRIAL_SIGNUP,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct DecisionEngine {
    config: Arc<SimConfig>,
    /// metric name → owning experiment name.
    metric_owner: HashMap<String, String>,
}

impl DecisionEngine {
    pub fn new(config: Arc<SimConfig>) -> SimResult<Self> {
        let mut metric_owner: HashMap<String, String> = HashMap::new();
        for (name, experiment) in &config.experiments {
            for metric in &experiment.outcome_metrics {
                if let Some(first) = metric_owner.insert(metric.clone(), name.clone()) {
                    return Err(SimError::DuplicateMetric {
                        metric: metric.clone(),
                        first,
                        second: name.clone(),
                    });
                }
            }
        }
        Ok(Self {
            config,
            metric_owner,
        })
    }

    /// One Bernoulli trial: does `metric` fire for this journey?
    pub fn should_fire(
        &self,
        metric: &str,
        country: Country,
        flags: &EvaluatedFlags,
        rng: &mut SimRng,
    ) -> bool {
        let mut rate = self.base_rate(metric, country.region_key());

        if metric == METRIC_TRIAL_SIGNUP {
            rate *= self.trial_multiplier(metric, flags.trial_days);
        }

        let rate = (rate + rng.noise(self.config.randomness.noise_level)).clamp(0.0, 1.0);
        rng.chance(rate)
    }

    fn base_rate(&self, metric: &str, region: &str) -> f64 {
        let Some(owner) = self.metric_owner.get(metric) else {
            log::warn!("metric '{metric}' not registered by any experiment; rate 0");
            return 0.0;
        };
        self.config.experiments[owner]
            .conversion_rates
            .get(metric)
            .and_then(|by_region| by_region.get(region))
            .copied()
            .unwrap_or(0.0)
    }

    fn trial_multiplier(&self, metric: &str, trial_days: i64) -> f64 {
        self.metric_owner
            .get(metric)
            .and_then(|owner| {
                self.config.experiments[owner]
                    .trial_duration_multiplier
                    .get(&trial_days.to_string())
            })
            .copied()
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExperimentConfig, RandomnessConfig, UserPools};
    use crate::flags::FlagValue;
    use std::collections::BTreeMap;

    fn flags_with_trial_days(days: i64) -> EvaluatedFlags {
        EvaluatedFlags {
            trial_days: days,
            seasonal_banner: String::new(),
            hero_banner: FlagValue::Object(Default::default()),
        }
    }

    fn config_with_rate(metric: &str, region: &str, rate: f64) -> Arc<SimConfig> {
        let mut conversion_rates = HashMap::new();
        conversion_rates.insert(
            metric.to_string(),
            HashMap::from([(region.to_string(), rate)]),
        );
        let mut experiments = BTreeMap::new();
        experiments.insert(
            "trial_duration".to_string(),
            ExperimentConfig {
                flag: "number-of-days-trial".into(),
                outcome_metrics: vec![metric.to_string()],
                conversion_rates,
                trial_duration_multiplier: HashMap::new(),
            },
        );
        Arc::new(SimConfig {
            duration_secs: 1,
            records_per_second: 1,
            experiments,
            user_generation: UserPools {
                countries: vec![Country::US],
                pet_types: vec!["dog".into()],
                plan_types: vec!["basic".into()],
                payment_types: vec!["paypal".into()],
            },
            randomness: RandomnessConfig {
                noise_level: 0.0,
                time_variation: false,
            },
            revenue: HashMap::new(),
        })
    }

    #[test]
    fn rate_one_with_zero_noise_always_fires() {
        let engine = DecisionEngine::new(config_with_rate("trial_signup", "US", 1.0)).unwrap();
        let flags = flags_with_trial_days(7);
        let mut rng = SimRng::seeded(1);
        for _ in 0..100 {
            assert!(engine.should_fire("trial_signup", Country::US, &flags, &mut rng));
        }
    }

    #[test]
    fn rate_zero_with_zero_noise_never_fires() {
        let engine = DecisionEngine::new(config_with_rate("trial_signup", "US", 0.0)).unwrap();
        let flags = flags_with_trial_days(7);
        let mut rng = SimRng::seeded(1);
        for _ in 0..100 {
            assert!(!engine.should_fire("trial_signup", Country::US, &flags, &mut rng));
        }
    }

    #[test]
    fn france_and_germany_use_the_eu_rate() {
        let engine = DecisionEngine::new(config_with_rate("trial_signup", "EU", 1.0)).unwrap();
        let flags = flags_with_trial_days(7);
        let mut rng = SimRng::seeded(2);
        assert!(engine.should_fire("trial_signup", Country::FR, &flags, &mut rng));
        assert!(engine.should_fire("trial_signup", Country::DE, &flags, &mut rng));
        // US has no entry under "US" in this table, so it never fires.
        assert!(!engine.should_fire("trial_signup", Country::US, &flags, &mut rng));
    }

    #[test]
    fn trial_duration_multiplier_scales_the_signup_rate() {
        let config = config_with_rate("trial_signup", "US", 0.5);
        let mut config = (*config).clone();
        config
            .experiments
            .get_mut("trial_duration")
            .unwrap()
            .trial_duration_multiplier
            .insert("30".into(), 2.0);
        let engine = DecisionEngine::new(Arc::new(config)).unwrap();

        // 0.5 × 2.0 clamps to 1.0: always fires at 30 trial days.
        let mut rng = SimRng::seeded(3);
        let flags = flags_with_trial_days(30);
        for _ in 0..100 {
            assert!(engine.should_fire("trial_signup", Country::US, &flags, &mut rng));
        }
    }

    #[test]
    fn unknown_trial_duration_multiplies_by_one() {
        let config = config_with_rate("trial_signup", "US", 1.0);
        let engine = DecisionEngine::new(config).unwrap();
        let mut rng = SimRng::seeded(4);
        // No multiplier table at all: rate stays 1.0.
        assert!(engine.should_fire("trial_signup", Country::US, &flags_with_trial_days(99), &mut rng));
    }

    #[test]
    fn unregistered_metric_defaults_to_rate_zero() {
        let engine = DecisionEngine::new(config_with_rate("trial_signup", "US", 1.0)).unwrap();
        let flags = flags_with_trial_days(7);
        let mut rng = SimRng::seeded(5);
        for _ in 0..50 {
            assert!(!engine.should_fire("newsletter_open", Country::US, &flags, &mut rng));
        }
    }

    #[test]
    fn duplicate_metric_registration_is_rejected() {
        let base = config_with_rate("trial_signup", "US", 1.0);
        let mut config = (*base).clone();
        config.experiments.insert(
            "second_experiment".to_string(),
            ExperimentConfig {
                flag: "other-flag".into(),
                outcome_metrics: vec!["trial_signup".into()],
                conversion_rates: HashMap::new(),
                trial_duration_multiplier: HashMap::new(),
            },
        );
        let err = DecisionEngine::new(Arc::new(config)).unwrap_err();
        assert!(matches!(err, SimError::DuplicateMetric { .. }));
    }
}
