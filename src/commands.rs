// Commands - Dependency injection for the API server and the explore client
use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use futures::StreamExt;

use crate::application::coordination::CoordinationView;
use crate::application::device_service::DeviceService;
use crate::application::view_runtime::ViewRuntime;
use crate::cli::Command;
use crate::domain::device::{DeviceId, FloorIndex};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_feed::{ApiClient, HttpHistoryFeed, HttpSnapshotFeed};
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::console::describe;
use crate::presentation::router::build_router;

const EXPLORE_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Serve => serve(config).await,
        Command::Explore { floor, device, field } => explore(config, floor, DeviceId::new(device), field).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    // Create repository (infrastructure layer)
    let influx = config.influx;
    let repository = Arc::new(InfluxRepository::new(
        influx.host,
        influx.token,
        influx.database,
        influx.retention_policy,
        influx.measurement,
        influx.device_tag,
    ));

    // Create services (application layer)
    let device_service = DeviceService::new(repository, config.feeds.history_hours, config.feeds.max_points);

    let state = Arc::new(AppState {
        device_service,
        api_key: config.server.api_key,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting floor-telemetry API on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

/// Drive one floor/device/field selection against the API and print every
/// render until the view settles.
async fn explore(
    config: AppConfig,
    floor: FloorIndex,
    device: DeviceId,
    field: Option<String>,
) -> anyhow::Result<()> {
    let api = ApiClient::from_settings(&config.feeds)?;
    let snapshot_feed = Arc::new(HttpSnapshotFeed::new(api.clone()));
    let history_feed = Arc::new(HttpHistoryFeed::new(api, config.feeds.history_hours));

    let view = CoordinationView::new(0, config.feeds.cache_capacity);
    let handle = ViewRuntime::new(view, snapshot_feed, history_feed).spawn();
    let mut renders = Box::pin(handle.render_updates());

    handle.select_floor(floor);
    handle.select_device(Some(device.clone()));
    if let Some(field) = field {
        handle.view_history(device, field);
    }

    let watch = async {
        while let Some(render) = renders.next().await {
            println!("{}", describe(&render));
            if render.device.is_some() && render.is_settled() {
                break;
            }
        }
    };

    tokio::time::timeout(EXPLORE_TIMEOUT, watch)
        .await
        .context("timed out waiting for telemetry")?;
    Ok(())
}
