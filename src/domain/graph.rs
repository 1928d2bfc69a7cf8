// Graph options - which device field is pinned to the history graph
use super::device::DeviceId;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphOptions {
    pub device: Option<DeviceId>,
    pub field: Option<String>,
}

impl GraphOptions {
    pub fn set_target(&mut self, device: DeviceId, field: impl Into<String>) {
        self.device = Some(device);
        self.field = Some(field.into());
    }

    pub fn clear(&mut self) {
        self.device = None;
        self.field = None;
    }

    pub fn is_empty(&self) -> bool {
        self.device.is_none() && self.field.is_none()
    }

    /// The pinned field, only if it was chosen for `device`
    pub fn target_for(&self, device: Option<&DeviceId>) -> Option<&str> {
        match (&self.device, device) {
            (Some(pinned), Some(current)) if pinned == current => self.field.as_deref(),
            _ => None,
        }
    }
}
