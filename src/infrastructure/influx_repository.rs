// InfluxDB repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::device::DeviceId;
use crate::domain::telemetry::{FieldValue, HistoryPoint, Snapshot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
    device_tag: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(
        host: String,
        token: String,
        database: String,
        retention_policy: String,
        measurement: String,
        device_tag: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
            measurement,
            device_tag,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }

    fn latest_query(&self, device: &DeviceId) -> String {
        format!(
            "SELECT last(*) FROM \"{}\" WHERE \"{}\" = '{}'",
            self.measurement,
            self.device_tag,
            quote_literal(device.as_str())
        )
    }

    fn history_query(&self, device: &DeviceId, hours: i32) -> String {
        format!(
            "SELECT * FROM \"{}\" WHERE \"{}\" = '{}' AND time >= now() - {}h",
            self.measurement,
            self.device_tag,
            quote_literal(device.as_str()),
            hours
        )
    }
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn list_device_ids(&self) -> Result<Vec<DeviceId>> {
        let query = format!(
            "SHOW TAG VALUES FROM \"{}\" WITH KEY = \"{}\"",
            self.measurement, self.device_tag
        );
        let response = self.execute_query(&query).await?;

        let mut devices = Vec::new();
        for series in first_series(&response) {
            for value_row in &series.values {
                if let Some(device) = value_row.get(1).and_then(|v| v.as_str()) {
                    devices.push(DeviceId::new(device));
                }
            }
        }

        Ok(devices)
    }

    async fn latest_values(&self, device: &DeviceId) -> Result<Option<Snapshot>> {
        let query = self.latest_query(device);
        tracing::debug!("Executing latest values query: {}", query);
        let response = self.execute_query(&query).await?;

        let Some(series) = first_series(&response).first() else {
            return Ok(None);
        };
        let Some(row) = series.values.first() else {
            return Ok(None);
        };

        Ok(Some(parse_latest_row(device, &series.columns, row)))
    }

    async fn history(&self, device: &DeviceId, hours: i32, max_points: usize) -> Result<Vec<HistoryPoint>> {
        let query = self.history_query(device, hours);
        tracing::debug!("Executing history query: {}", query);
        let response = self.execute_query(&query).await?;

        let mut points = Vec::new();
        for series in first_series(&response) {
            let time_idx = series.columns.iter().position(|c| c == "time").unwrap_or(0);

            for value_row in &series.values {
                let Some(time_ms) = value_row.get(time_idx).and_then(parse_time_ms) else {
                    continue;
                };

                let values: BTreeMap<String, f64> = series
                    .columns
                    .iter()
                    .zip(value_row)
                    .enumerate()
                    .filter(|(i, (column, _))| *i != time_idx && **column != self.device_tag)
                    .filter_map(|(_, (column, value))| value.as_f64().map(|v| (column.clone(), v)))
                    .collect();

                if !values.is_empty() {
                    points.push(HistoryPoint::new(time_ms, values));
                }
            }
        }

        points.sort_by_key(|p| p.time_ms);
        Ok(downsample_points(points, max_points))
    }
}

fn first_series(response: &InfluxQLResponse) -> &[InfluxQLSeries] {
    response
        .results
        .first()
        .and_then(|r| r.series.as_deref())
        .unwrap_or(&[])
}

/// Escape a value for use inside a single-quoted InfluxQL string
fn quote_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn parse_time_ms(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.timestamp_millis()),
        // epoch=ms responses
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// `last(*)` names each column `last_<field>`
fn parse_latest_row(device: &DeviceId, columns: &[String], row: &[serde_json::Value]) -> Snapshot {
    let mut time_ms = None;
    let mut fields = BTreeMap::new();

    for (column, value) in columns.iter().zip(row) {
        if column == "time" {
            time_ms = parse_time_ms(value);
            continue;
        }
        let name = column.strip_prefix("last_").unwrap_or(column);
        let value = match value {
            serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
            serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
            _ => None,
        };
        if let Some(value) = value {
            fields.insert(name.to_string(), value);
        }
    }

    Snapshot::new(device.clone(), time_ms, fields)
}

/// Downsample history using bucket averaging, per field
fn downsample_points(points: Vec<HistoryPoint>, max_points: usize) -> Vec<HistoryPoint> {
    if max_points == 0 || points.len() <= max_points {
        return points;
    }

    let bucket_size = (points.len() as f64 / max_points as f64).ceil() as usize;
    let mut downsampled = Vec::with_capacity(max_points);

    for chunk in points.chunks(bucket_size) {
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for point in chunk {
            for (field, value) in &point.values {
                let entry = sums.entry(field.as_str()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }

        // Use middle point's timestamp and average value
        let mid_idx = chunk.len() / 2;
        let values = sums
            .into_iter()
            .map(|(field, (sum, count))| (field.to_string(), sum / count as f64))
            .collect();
        downsampled.push(HistoryPoint::new(chunk[mid_idx].time_ms, values));
    }

    downsampled
}
