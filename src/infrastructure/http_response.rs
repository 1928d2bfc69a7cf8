// HTTP response utilities for the telemetry API
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header carrying the shared API key, on both sides of the wire
pub const API_KEY_HEADER: &str = "x-api-key";

/// Error body shared by the auth gate and the handlers
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("You do not have permission to access this resource")]
    PermissionDenied,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("No telemetry found for device {0}")]
    NotFound(String),

    #[error("Upstream telemetry query failed")]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Upstream(e) => tracing::error!("Telemetry query failed: {:#}", e),
            ApiError::PermissionDenied => tracing::warn!("Rejected request with invalid API key"),
            ApiError::BadRequest(_) | ApiError::NotFound(_) => {}
        }

        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permission_denied_body() {
        let response = ApiError::PermissionDenied.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            ErrorBody {
                code: 403,
                message: "You do not have permission to access this resource".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_bad_request_body() {
        let response = ApiError::BadRequest("hours must be a number".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, 400);
        assert_eq!(body.message, "Invalid request: hours must be a number");
    }

    #[test]
    fn test_upstream_maps_to_bad_gateway() {
        let error = ApiError::from(anyhow::anyhow!("influx down"));
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
    }
}
