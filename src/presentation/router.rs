// Router assembly for the telemetry API
use crate::presentation::app_state::AppState;
use crate::presentation::auth::require_api_key;
use crate::presentation::handlers::{device_history, device_snapshot, health_check, list_devices};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/devices", get(list_devices))
        .route("/devices/:id/data", get(device_snapshot))
        .route("/devices/:id/history", get(device_history))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/healthz", get(health_check))
        .merge(protected)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
