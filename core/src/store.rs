//! Warehouse persistence layer.
//!
//! RULE: Only store.rs talks to the database. The sink and the HTTP
//! handlers call store methods — they never execute SQL directly.
//!
//! The schema mirrors the experimentation platform's metric export
//! table, so warehouse-routed events line up with platform-tracked ones.

use crate::error::SimResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

pub const CONTEXT_KIND_USER: &str = "user";

/// One METRIC_EVENTS row.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvent {
    pub event_id: String,
    pub event_key: String,
    pub context_kind: String,
    pub context_key: String,
    pub event_value: Option<f64>,
    pub received_time: DateTime<Utc>,
}

impl MetricEvent {
    /// Fresh event id and current timestamp.
    pub fn new(event_key: &str, context_key: &str, value: Option<f64>) -> Self {
        Self::at(event_key, context_key, value, Utc::now())
    }

    pub fn at(
        event_key: &str,
        context_key: &str,
        value: Option<f64>,
        received_time: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            event_key: event_key.to_string(),
            context_kind: CONTEXT_KIND_USER.to_string(),
            context_key: context_key.to_string(),
            event_value: value,
            received_time,
        }
    }
}

pub struct MetricStore {
    conn: Connection,
}

impl MetricStore {
    /// Open (or create) the warehouse database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// In-memory warehouse (tests and the default runner mode).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_metric_events.sql"))?;
        Ok(())
    }

    pub fn insert_event(&self, event: &MetricEvent) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO METRIC_EVENTS
               (EVENT_ID, EVENT_KEY, CONTEXT_KIND, CONTEXT_KEY, EVENT_VALUE, RECEIVED_TIME)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.event_id,
                event.event_key,
                event.context_kind,
                event.context_key,
                event.event_value,
                event.received_time.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn count_for_event(&self, event_key: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM METRIC_EVENTS WHERE EVENT_KEY = ?1",
            params![event_key],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn total_events(&self) -> SimResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM METRIC_EVENTS", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn events_for_context(&self, context_key: &str) -> SimResult<Vec<MetricEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT EVENT_ID, EVENT_KEY, CONTEXT_KIND, CONTEXT_KEY, EVENT_VALUE, RECEIVED_TIME
             FROM METRIC_EVENTS WHERE CONTEXT_KEY = ?1 ORDER BY RECEIVED_TIME",
        )?;
        let rows = stmt.query_map(params![context_key], |row| {
            let raw_time: String = row.get(5)?;
            let received_time = DateTime::parse_from_rfc3339(&raw_time)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
            Ok(MetricEvent {
                event_id: row.get(0)?,
                event_key: row.get(1)?,
                context_kind: row.get(2)?,
                context_key: row.get(3)?,
                event_value: row.get(4)?,
                received_time,
            })
        })?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MetricStore {
        let store = MetricStore::in_memory().expect("in-memory store");
        store.migrate().expect("migration");
        store
    }

    #[test]
    fn inserted_events_round_trip() {
        let store = store();
        let event = MetricEvent::new("trial_signup", "user-1", None);
        store.insert_event(&event).unwrap();
        store
            .insert_event(&MetricEvent::new("total_revenue", "user-1", Some(49.99)))
            .unwrap();

        assert_eq!(store.total_events().unwrap(), 2);
        assert_eq!(store.count_for_event("trial_signup").unwrap(), 1);
        assert_eq!(store.count_for_event("banner_click").unwrap(), 0);

        let events = store.events_for_context("user-1").unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.event_value == Some(49.99)));
        assert!(events.iter().all(|e| e.context_kind == CONTEXT_KIND_USER));
    }

    #[test]
    fn migration_is_idempotent() {
        let store = store();
        store.migrate().expect("second migration");
    }
}
