use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API error type. Bodies follow the `{success:false, error}` contract
/// the demo site's frontend expects.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Warehouse error: {0}")]
    Warehouse(String),

    #[error("Simulation error: {0}")]
    Simulation(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Warehouse(msg) => {
                log::error!("warehouse error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to insert event: {msg}"),
                )
            }
            ApiError::Simulation(msg) => {
                log::error!("simulation error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
