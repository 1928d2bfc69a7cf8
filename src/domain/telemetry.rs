// Telemetry data domain models
use super::device::DeviceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// A single reading as reported by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// Latest known field values for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub device: DeviceId,
    #[serde(default)]
    pub time_ms: Option<i64>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Snapshot {
    pub fn new(device: DeviceId, time_ms: Option<i64>, fields: BTreeMap<String, FieldValue>) -> Self {
        Self {
            device,
            time_ms,
            fields,
        }
    }

    /// Fields that can be pinned to a graph
    pub fn numeric_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, v)| v.as_f64().is_some())
            .map(|(k, _)| k.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub time_ms: i64,
    pub values: BTreeMap<String, f64>,
}

impl HistoryPoint {
    pub fn new(time_ms: i64, values: BTreeMap<String, f64>) -> Self {
        Self { time_ms, values }
    }
}

/// Past readings for one device, ordered by timestamp ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    pub device: DeviceId,
    pub points: Vec<HistoryPoint>,
}

impl HistorySeries {
    pub fn new(device: DeviceId, mut points: Vec<HistoryPoint>) -> Self {
        points.sort_by_key(|p| p.time_ms);
        Self { device, points }
    }

    /// Extract the series of one field, skipping points that lack it
    pub fn slice(&self, field: &str) -> Vec<TimeSeriesPoint> {
        self.points
            .iter()
            .filter_map(|p| p.values.get(field).map(|v| TimeSeriesPoint::new(p.time_ms, *v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time_ms: i64, values: &[(&str, f64)]) -> HistoryPoint {
        HistoryPoint::new(
            time_ms,
            values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
    }

    #[test]
    fn test_history_is_sorted_on_construction() {
        let series = HistorySeries::new(
            DeviceId::new("D1"),
            vec![point(300, &[]), point(100, &[]), point(200, &[])],
        );
        let times: Vec<i64> = series.points.iter().map(|p| p.time_ms).collect();
        assert_eq!(times, vec![100, 200, 300]);
    }

    #[test]
    fn test_slice_skips_points_without_field() {
        let series = HistorySeries::new(
            DeviceId::new("D1"),
            vec![
                point(1, &[("temperature", 20.5), ("humidity", 40.0)]),
                point(2, &[("humidity", 41.0)]),
                point(3, &[("temperature", 21.0)]),
            ],
        );

        assert_eq!(
            series.slice("temperature"),
            vec![TimeSeriesPoint::new(1, 20.5), TimeSeriesPoint::new(3, 21.0)]
        );
        assert!(series.slice("co2").is_empty());
    }

    #[test]
    fn test_numeric_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("temperature".to_string(), FieldValue::Number(21.0));
        fields.insert("status".to_string(), FieldValue::Text("ok".to_string()));
        fields.insert("online".to_string(), FieldValue::Bool(true));
        let snapshot = Snapshot::new(DeviceId::new("D1"), None, fields);

        let numeric: Vec<&str> = snapshot.numeric_fields().collect();
        assert_eq!(numeric, vec!["temperature"]);
    }

    #[test]
    fn test_field_value_wire_format() {
        let json = r#"{"device":"D1","fields":{"temperature":21.5,"status":"ok","online":false}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.time_ms, None);
        assert_eq!(snapshot.fields["temperature"], FieldValue::Number(21.5));
        assert_eq!(snapshot.fields["status"], FieldValue::Text("ok".to_string()));
        assert_eq!(snapshot.fields["online"], FieldValue::Bool(false));
    }
}
