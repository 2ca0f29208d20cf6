//! Warehouse insert endpoint.
//!
//! POST /api/insertMetricEvent — accepts a tracked event and writes one
//! METRIC_EVENTS row, generating the event id and timestamp server-side.
//! Single-attempt: a failed insert is reported, never retried.

use axum::{extract::State, Json};
use gravity_core::store::MetricEvent;
use serde::Deserialize;
use serde_json::json;

use crate::{error::ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertMetricEventRequest {
    #[serde(default)]
    pub event_name: String,
    /// Monetary amount for revenue metrics; NULL in the row otherwise.
    #[serde(default)]
    pub event_value: Option<f64>,
    #[serde(default)]
    pub context: ContextPayload,
}

/// The caller's user context. Only the key lands in the warehouse row;
/// other attributes are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ContextPayload {
    #[serde(default)]
    pub key: String,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

pub async fn insert_metric_event(
    State(state): State<AppState>,
    Json(request): Json<InsertMetricEventRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.event_name.is_empty() || request.context.key.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing eventName or context.key".into(),
        ));
    }

    let event = MetricEvent::new(
        &request.event_name,
        &request.context.key,
        request.event_value,
    );

    let store = state
        .store
        .lock()
        .map_err(|_| ApiError::Warehouse("store lock poisoned".into()))?;
    store
        .insert_event(&event)
        .map_err(|e| ApiError::Warehouse(e.to_string()))?;

    log::info!(
        "inserted metric event '{}' for context {}",
        event.event_key,
        event.context_key
    );
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use crate::{create_router, test_support::test_state};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_event_is_inserted_and_acknowledged() {
        let state = test_state();
        let store = state.store.clone();
        let app = create_router(state);

        let response = app
            .oneshot(post_json(
                "/api/insertMetricEvent",
                r#"{"eventName":"trial_signup","context":{"key":"user-1","country":"US"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["success"], true);

        let store = store.lock().unwrap();
        assert_eq!(store.count_for_event("trial_signup").unwrap(), 1);
        let rows = store.events_for_context("user-1").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].event_value.is_none());
    }

    #[tokio::test]
    async fn event_value_is_stored_when_present() {
        let state = test_state();
        let store = state.store.clone();
        let app = create_router(state);

        let response = app
            .oneshot(post_json(
                "/api/insertMetricEvent",
                r#"{"eventName":"total_revenue","eventValue":49.99,"context":{"key":"user-2"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let store = store.lock().unwrap();
        let rows = store.events_for_context("user-2").unwrap();
        assert_eq!(rows[0].event_value, Some(49.99));
    }

    #[tokio::test]
    async fn missing_event_name_is_a_bad_request() {
        let app = create_router(test_state());
        let response = app
            .oneshot(post_json(
                "/api/insertMetricEvent",
                r#"{"context":{"key":"user-1"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["success"], false);
    }

    #[tokio::test]
    async fn missing_context_key_is_a_bad_request() {
        let app = create_router(test_state());
        let response = app
            .oneshot(post_json(
                "/api/insertMetricEvent",
                r#"{"eventName":"trial_signup","context":{}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_post_methods_are_rejected() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/insertMetricEvent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
