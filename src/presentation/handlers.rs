// HTTP request handlers
use crate::domain::device::DeviceId;
use crate::domain::telemetry::{HistorySeries, Snapshot};
use crate::infrastructure::http_response::{ApiError, ApiResult};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<i32>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all devices
pub async fn list_devices(State(state): State<Arc<AppState>>) -> ApiResult<Vec<DeviceId>> {
    let devices = state.device_service.list_devices().await?;
    Ok(Json(devices))
}

/// Latest snapshot of one device
pub async fn device_snapshot(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Snapshot> {
    let device = DeviceId::new(id);
    match state.device_service.snapshot(&device).await? {
        Some(snapshot) => Ok(Json(snapshot)),
        None => Err(ApiError::NotFound(device.to_string())),
    }
}

/// History of one device over the requested window
pub async fn device_history(
    Path(id): Path<String>,
    query: Result<Query<RangeQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<HistorySeries> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let device = DeviceId::new(id);
    let series = state.device_service.history(&device, query.hours).await?;
    Ok(Json(series))
}
