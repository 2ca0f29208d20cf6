//! Shared primitive types and metric names used across the simulation.

/// Record index within a run (count of journeys processed so far).
pub type RecordIndex = u64;

// ── Metric names ───────────────────────────────────────────────
// Baseline event recorded for every journey.
pub const METRIC_PAGE_VIEW: &str = "page_view";
// Outcome metrics rolled by the decision engine.
pub const METRIC_TRIAL_SIGNUP: &str = "trial_signup";
pub const METRIC_TRIAL_TO_PAID: &str = "trial_to_paid_conversion";
pub const METRIC_TOTAL_REVENUE: &str = "total_revenue";
pub const METRIC_BANNER_CLICK: &str = "banner_click";
pub const METRIC_HERO_ENGAGEMENT: &str = "hero_engagement";
