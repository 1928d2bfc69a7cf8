// HTTP feeds - Snapshot and history producers backed by the telemetry API
use crate::application::feed::{DeviceFeed, FeedError};
use crate::domain::device::DeviceId;
use crate::domain::telemetry::{HistorySeries, Snapshot};
use crate::infrastructure::config::FeedSettings;
use crate::infrastructure::http_response::API_KEY_HEADER;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Shared client for the telemetry API, sending the static key on every call
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build telemetry API client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_settings(settings: &FeedSettings) -> anyhow::Result<Self> {
        Self::new(
            &settings.base_url,
            &settings.api_key,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn device_url(&self, device: &DeviceId, resource: &str) -> String {
        format!(
            "{}/devices/{}/{}",
            self.base_url,
            urlencoding::encode(device.as_str()),
            resource
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T, FeedError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| FeedError::FetchFailed(e.to_string()))?;

        match response.status() {
            StatusCode::FORBIDDEN => return Err(FeedError::Unauthorized),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(FeedError::FetchFailed(format!("{}: {}", status, body)));
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FeedError::FetchFailed(format!("invalid response: {}", e)))
    }
}

pub struct HttpSnapshotFeed {
    api: ApiClient,
}

impl HttpSnapshotFeed {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DeviceFeed for HttpSnapshotFeed {
    type Output = Snapshot;

    async fn fetch(&self, device: &DeviceId) -> Result<Snapshot, FeedError> {
        let url = self.api.device_url(device, "data");
        tracing::debug!("Fetching snapshot for {}", device);
        self.api.get_json(&url, &[]).await
    }
}

pub struct HttpHistoryFeed {
    api: ApiClient,
    hours: i32,
}

impl HttpHistoryFeed {
    pub fn new(api: ApiClient, hours: i32) -> Self {
        Self { api, hours }
    }
}

#[async_trait]
impl DeviceFeed for HttpHistoryFeed {
    type Output = HistorySeries;

    async fn fetch(&self, device: &DeviceId) -> Result<HistorySeries, FeedError> {
        let url = self.api.device_url(device, "history");
        tracing::debug!("Fetching {}h history for {}", self.hours, device);
        let series: HistorySeries = self.api.get_json(&url, &[("hours", self.hours.to_string())]).await?;
        // Order is part of the contract; don't trust the wire for it
        Ok(HistorySeries::new(series.device, series.points))
    }
}
