//! Journey simulator — one synthetic user, end to end.
//!
//! EVENT ORDER (fixed, documented, never reordered):
//!   1. page_view                 always, counted only, never forwarded
//!   2. trial_signup              decision engine
//!   3. trial_to_paid_conversion  only after a signup
//!   4. total_revenue             consequence of a conversion, no roll
//!   5. banner_click              decision engine AND non-empty banner
//!   6. hero_engagement           decision engine, independent
//!
//! Fired events are forwarded through the flag platform's track call or
//! the warehouse sink, chosen per user by the outcome-location flag; an
//! unrecognized flag value means the event is counted but not forwarded.
//! Forwarding failures are logged and never abort the journey.

use crate::{
    config::SimConfig,
    decision::DecisionEngine,
    error::SimResult,
    flags::{
        EvaluatedFlags, FlagClient, FlagValue, FLAG_OUTCOME_LOCATION, OUTCOME_PLATFORM,
        OUTCOME_WAREHOUSE,
    },
    profile::UserProfile,
    rng::SimRng,
    sink::EventSink,
    types::{
        METRIC_BANNER_CLICK, METRIC_HERO_ENGAGEMENT, METRIC_PAGE_VIEW, METRIC_TOTAL_REVENUE,
        METRIC_TRIAL_SIGNUP, METRIC_TRIAL_TO_PAID,
    },
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Everything one journey produced: the profile it ran as, the flag
/// values it saw, and the ordered list of events that fired.
#[derive(Debug, Clone)]
pub struct JourneyOutcome {
    pub profile: UserProfile,
    pub flags: EvaluatedFlags,
    pub events: Vec<String>,
}

pub struct JourneySimulator {
    config: Arc<SimConfig>,
    decisions: DecisionEngine,
    flags: Arc<dyn FlagClient>,
    sink: Arc<dyn EventSink>,
}

impl JourneySimulator {
    pub fn new(
        config: Arc<SimConfig>,
        flags: Arc<dyn FlagClient>,
        sink: Arc<dyn EventSink>,
    ) -> SimResult<Self> {
        let decisions = DecisionEngine::new(Arc::clone(&config))?;
        Ok(Self {
            config,
            decisions,
            flags,
            sink,
        })
    }

    pub fn run(&self, profile: UserProfile, rng: &mut SimRng) -> SimResult<JourneyOutcome> {
        let flag_values = EvaluatedFlags::evaluate(self.flags.as_ref(), &profile)?;
        let outcome_location = self
            .flags
            .evaluate(
                FLAG_OUTCOME_LOCATION,
                FlagValue::from(OUTCOME_PLATFORM),
                &profile,
            )?
            .as_str()
            .unwrap_or(OUTCOME_PLATFORM)
            .to_string();
        log::debug!(
            "journey {}: outcome-location={outcome_location}",
            profile.key
        );

        let mut events = vec![METRIC_PAGE_VIEW.to_string()];
        let country = profile.country;

        if self.decisions.should_fire(METRIC_TRIAL_SIGNUP, country, &flag_values, rng) {
            self.fire(METRIC_TRIAL_SIGNUP, None, &profile, &outcome_location, &mut events, rng);

            if self.decisions.should_fire(METRIC_TRIAL_TO_PAID, country, &flag_values, rng) {
                self.fire(METRIC_TRIAL_TO_PAID, None, &profile, &outcome_location, &mut events, rng);
                // Revenue follows a conversion deterministically.
                let amount = self.revenue_for(&profile);
                self.fire(METRIC_TOTAL_REVENUE, amount, &profile, &outcome_location, &mut events, rng);
            }
        }

        if !flag_values.seasonal_banner.is_empty()
            && self.decisions.should_fire(METRIC_BANNER_CLICK, country, &flag_values, rng)
        {
            self.fire(METRIC_BANNER_CLICK, None, &profile, &outcome_location, &mut events, rng);
        }

        if self.decisions.should_fire(METRIC_HERO_ENGAGEMENT, country, &flag_values, rng) {
            self.fire(METRIC_HERO_ENGAGEMENT, None, &profile, &outcome_location, &mut events, rng);
        }

        Ok(JourneyOutcome {
            profile,
            flags: flag_values,
            events,
        })
    }

    fn fire(
        &self,
        metric: &str,
        value: Option<f64>,
        profile: &UserProfile,
        outcome_location: &str,
        events: &mut Vec<String>,
        rng: &mut SimRng,
    ) {
        events.push(metric.to_string());

        let forwarded = match outcome_location {
            OUTCOME_WAREHOUSE => self.sink.forward(metric, value, profile, self.event_time(rng)),
            OUTCOME_PLATFORM => self.flags.track(metric, value, profile),
            other => {
                log::warn!(
                    "unknown outcome-location '{other}' for {}; '{metric}' counted only",
                    profile.key
                );
                Ok(())
            }
        };
        if let Err(e) = forwarded {
            log::warn!("forwarding '{metric}' for {} failed: {e}", profile.key);
        }
    }

    /// Warehouse timestamps spread over the last ten minutes when
    /// time_variation is on; platform tracking always stamps its own.
    fn event_time(&self, rng: &mut SimRng) -> DateTime<Utc> {
        let now = Utc::now();
        if self.config.randomness.time_variation {
            now - Duration::seconds(rng.next_u64_below(600) as i64)
        } else {
            now
        }
    }

    fn revenue_for(&self, profile: &UserProfile) -> Option<f64> {
        self.config
            .revenue
            .get(&profile.plan_type)?
            .get(profile.country.region_key())
            .copied()
    }
}
