// API key gate in front of the telemetry routes
use crate::infrastructure::http_response::{ApiError, API_KEY_HEADER};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Reject any request whose `x-api-key` does not match the configured
/// secret before it reaches a handler
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let supplied = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match supplied {
        Some(key) if key == state.api_key => Ok(next.run(request).await),
        _ => Err(ApiError::PermissionDenied),
    }
}
