//! Batch signup-simulation endpoint.
//!
//! POST /api/runSimulation — generates a batch of synthetic profiles,
//! evaluates the trial-length flag for each, and tracks one signup per
//! profile through the flag client.

use axum::{extract::State, Json};
use gravity_core::{
    flags::{FlagValue, DEFAULT_TRIAL_DAYS, FLAG_TRIAL_DAYS},
    profile::{ProfileGenerator, UserProfile},
    rng::SimRng,
    types::METRIC_TRIAL_SIGNUP,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, AppState};

const DEFAULT_NUM_USERS: u32 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSimulationRequest {
    pub num_users: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedSignup {
    pub user: UserProfile,
    pub trial_days: i64,
}

#[derive(Debug, Serialize)]
pub struct RunSimulationResponse {
    pub success: bool,
    pub results: Vec<SimulatedSignup>,
}

pub async fn run_simulation(
    State(state): State<AppState>,
    request: Option<Json<RunSimulationRequest>>,
) -> Result<Json<RunSimulationResponse>, ApiError> {
    let num_users = request
        .and_then(|Json(r)| r.num_users)
        .unwrap_or(DEFAULT_NUM_USERS);

    let generator = ProfileGenerator::new(state.sim_config.user_generation.clone());
    let mut rng = SimRng::from_entropy();
    let mut results = Vec::with_capacity(num_users as usize);

    for _ in 0..num_users {
        let user = generator.generate(&mut rng);
        let trial_days = state
            .flags
            .evaluate(FLAG_TRIAL_DAYS, FlagValue::from(DEFAULT_TRIAL_DAYS), &user)
            .map_err(|e| ApiError::Simulation(e.to_string()))?
            .as_i64()
            .unwrap_or(DEFAULT_TRIAL_DAYS);
        state
            .flags
            .track(METRIC_TRIAL_SIGNUP, None, &user)
            .map_err(|e| ApiError::Simulation(e.to_string()))?;
        results.push(SimulatedSignup { user, trial_days });
    }

    log::info!("runSimulation tracked {num_users} signups");
    Ok(Json(RunSimulationResponse {
        success: true,
        results,
    }))
}

#[cfg(test)]
mod tests {
    use crate::{create_router, test_support::test_state_with_flags};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use gravity_core::flags::{FlagValue, StaticFlagClient, FLAG_TRIAL_DAYS};
    use tower::ServiceExt;

    async fn parsed_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn defaults_to_ten_users_without_a_body() {
        let client = std::sync::Arc::new(StaticFlagClient::new());
        let state = test_state_with_flags(client.clone());
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/runSimulation")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let parsed = parsed_body(response).await;
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["results"].as_array().unwrap().len(), 10);
        assert_eq!(client.tracked().len(), 10, "one signup tracked per user");
    }

    #[tokio::test]
    async fn honors_the_requested_user_count_and_flag_value() {
        let client = std::sync::Arc::new(
            StaticFlagClient::new().with_value(FLAG_TRIAL_DAYS, FlagValue::from(30)),
        );
        let state = test_state_with_flags(client.clone());
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/runSimulation")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"numUsers":3}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        let parsed = parsed_body(response).await;
        let results = parsed["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        for signup in results {
            assert_eq!(signup["trialDays"], 30);
            assert!(signup["user"]["key"].as_str().is_some());
        }
        assert_eq!(client.tracked().len(), 3);
    }
}
