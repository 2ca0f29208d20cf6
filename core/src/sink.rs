//! Outbound event forwarding strategy.
//!
//! The journey simulator fires events; where they land is an injected
//! strategy. NullSink keeps the engine standalone (events are only
//! counted), WarehouseSink writes METRIC_EVENTS rows. All forwarding is
//! best-effort and single-attempt — no retries anywhere.

use crate::{
    error::SimResult,
    profile::UserProfile,
    store::{MetricEvent, MetricStore},
};
use chrono::{DateTime, Utc};
use std::sync::Mutex;

pub trait EventSink: Send + Sync {
    fn forward(
        &self,
        event: &str,
        value: Option<f64>,
        profile: &UserProfile,
        at: DateTime<Utc>,
    ) -> SimResult<()>;
}

/// Standalone variant: nothing leaves the process.
pub struct NullSink;

impl EventSink for NullSink {
    fn forward(
        &self,
        _event: &str,
        _value: Option<f64>,
        _profile: &UserProfile,
        _at: DateTime<Utc>,
    ) -> SimResult<()> {
        Ok(())
    }
}

/// Connected variant: one METRIC_EVENTS row per forwarded event.
pub struct WarehouseSink {
    store: Mutex<MetricStore>,
}

impl WarehouseSink {
    pub fn new(store: MetricStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

impl EventSink for WarehouseSink {
    fn forward(
        &self,
        event: &str,
        value: Option<f64>,
        profile: &UserProfile,
        at: DateTime<Utc>,
    ) -> SimResult<()> {
        let store = self
            .store
            .lock()
            .map_err(|_| anyhow::anyhow!("warehouse sink lock poisoned"))?;
        store.insert_event(&MetricEvent::at(event, &profile.key, value, at))
    }
}
