// Device and floor selection domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key naming one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

pub type FloorIndex = u32;

/// The floor and device currently of interest to the user.
///
/// The device is expected to belong to `floor`; that coupling is upheld by
/// whoever emits selection events and is not checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub floor: FloorIndex,
    pub device: Option<DeviceId>,
}

impl Selection {
    pub fn new(floor: FloorIndex) -> Self {
        Self { floor, device: None }
    }
}
