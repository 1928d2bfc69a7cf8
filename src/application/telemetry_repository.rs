// Repository trait for telemetry data access
use crate::domain::device::DeviceId;
use crate::domain::telemetry::{HistoryPoint, Snapshot};
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// List all devices that have reported telemetry
    async fn list_device_ids(&self) -> anyhow::Result<Vec<DeviceId>>;

    /// Latest value of every field reported by a device, `None` if it never reported
    async fn latest_values(&self, device: &DeviceId) -> anyhow::Result<Option<Snapshot>>;

    /// Readings of a device over the last `hours`, downsampled to at most `max_points`
    async fn history(
        &self,
        device: &DeviceId,
        hours: i32,
        max_points: usize,
    ) -> anyhow::Result<Vec<HistoryPoint>>;
}
