// Device service - Use cases behind the telemetry API
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::device::DeviceId;
use crate::domain::telemetry::{HistorySeries, Snapshot};
use std::sync::Arc;

pub const MIN_HISTORY_HOURS: i32 = 1;
pub const MAX_HISTORY_HOURS: i32 = 168;

#[derive(Clone)]
pub struct DeviceService {
    repository: Arc<dyn TelemetryRepository>,
    default_hours: i32,
    max_points: usize,
}

impl DeviceService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, default_hours: i32, max_points: usize) -> Self {
        Self {
            repository,
            default_hours: clamp_hours(default_hours),
            max_points,
        }
    }

    pub async fn list_devices(&self) -> anyhow::Result<Vec<DeviceId>> {
        let mut ids = self.repository.list_device_ids().await?;
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    pub async fn snapshot(&self, device: &DeviceId) -> anyhow::Result<Option<Snapshot>> {
        self.repository.latest_values(device).await
    }

    pub async fn history(&self, device: &DeviceId, hours: Option<i32>) -> anyhow::Result<HistorySeries> {
        let hours = hours.map(clamp_hours).unwrap_or(self.default_hours);
        let points = self.repository.history(device, hours, self.max_points).await?;
        tracing::debug!("Fetched {} history points for {} over {}h", points.len(), device, hours);
        Ok(HistorySeries::new(device.clone(), points))
    }
}

fn clamp_hours(hours: i32) -> i32 {
    hours.clamp(MIN_HISTORY_HOURS, MAX_HISTORY_HOURS)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::telemetry::{FieldValue, HistoryPoint};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    /// In-memory repository shared by the service and API tests
    #[derive(Default)]
    pub(crate) struct MemoryRepository {
        pub snapshots: HashMap<DeviceId, Snapshot>,
        pub history: HashMap<DeviceId, Vec<HistoryPoint>>,
        pub requested_hours: Mutex<Vec<i32>>,
    }

    impl MemoryRepository {
        pub fn with_device(mut self, device: &str, temperature: f64) -> Self {
            let id = DeviceId::new(device);
            let mut fields = BTreeMap::new();
            fields.insert("temperature".to_string(), FieldValue::Number(temperature));
            self.snapshots
                .insert(id.clone(), Snapshot::new(id.clone(), Some(2_000), fields));

            let points = [(2_000, temperature), (1_000, temperature - 1.0)]
                .into_iter()
                .map(|(t, v)| {
                    let mut values = BTreeMap::new();
                    values.insert("temperature".to_string(), v);
                    HistoryPoint::new(t, values)
                })
                .collect();
            self.history.insert(id, points);
            self
        }
    }

    #[async_trait]
    impl TelemetryRepository for MemoryRepository {
        async fn list_device_ids(&self) -> anyhow::Result<Vec<DeviceId>> {
            Ok(self.snapshots.keys().cloned().collect())
        }

        async fn latest_values(&self, device: &DeviceId) -> anyhow::Result<Option<Snapshot>> {
            Ok(self.snapshots.get(device).cloned())
        }

        async fn history(
            &self,
            device: &DeviceId,
            hours: i32,
            max_points: usize,
        ) -> anyhow::Result<Vec<HistoryPoint>> {
            self.requested_hours.lock().unwrap().push(hours);
            let mut points = self.history.get(device).cloned().unwrap_or_default();
            points.truncate(max_points);
            Ok(points)
        }
    }

    #[tokio::test]
    async fn test_history_is_ordered_and_hours_clamped() {
        let repository = Arc::new(MemoryRepository::default().with_device("D1", 21.0));
        let service = DeviceService::new(repository.clone(), 6, 150);

        let series = service.history(&DeviceId::new("D1"), Some(10_000)).await.unwrap();
        let times: Vec<i64> = series.points.iter().map(|p| p.time_ms).collect();
        assert_eq!(times, vec![1_000, 2_000]);

        service.history(&DeviceId::new("D1"), None).await.unwrap();
        service.history(&DeviceId::new("D1"), Some(0)).await.unwrap();
        assert_eq!(*repository.requested_hours.lock().unwrap(), vec![168, 6, 1]);
    }

    #[tokio::test]
    async fn test_list_devices_sorted() {
        let repository = MemoryRepository::default()
            .with_device("D7", 1.0)
            .with_device("D42", 2.0)
            .with_device("D1", 3.0);
        let service = DeviceService::new(Arc::new(repository), 6, 150);

        let ids = service.list_devices().await.unwrap();
        assert_eq!(ids, vec![DeviceId::new("D1"), DeviceId::new("D42"), DeviceId::new("D7")]);
    }

    #[tokio::test]
    async fn test_unknown_device_has_no_snapshot() {
        let service = DeviceService::new(Arc::new(MemoryRepository::default()), 6, 150);
        assert!(service.snapshot(&DeviceId::new("nope")).await.unwrap().is_none());
    }
}
