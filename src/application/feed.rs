// Feed contract - Asynchronous per-device data producers
use crate::domain::device::DeviceId;
use crate::domain::telemetry::{HistorySeries, Snapshot};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum FeedError {
    /// The upstream gate rejected our credentials
    #[error("You do not have permission to access this resource")]
    Unauthorized,

    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Snapshot,
    History,
}

#[async_trait]
pub trait DeviceFeed: Send + Sync {
    type Output: Send + Sync + 'static;

    /// Fetch the current value for one device. Callers never pass an
    /// absent device; that case is answered locally with "no data".
    async fn fetch(&self, device: &DeviceId) -> Result<Self::Output, FeedError>;
}

pub type SnapshotFeed = Arc<dyn DeviceFeed<Output = Snapshot>>;
pub type HistoryFeed = Arc<dyn DeviceFeed<Output = HistorySeries>>;

/// Identifies one issued fetch. A result is only applied while its ticket
/// is still the latest one requested from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub device: DeviceId,
    pub generation: u64,
}

/// Published state of one feed.
#[derive(Debug)]
pub enum FeedState<T> {
    NoData,
    Loading {
        device: DeviceId,
        cached: Option<Arc<T>>,
    },
    Ready {
        device: DeviceId,
        value: Arc<T>,
    },
    Failed {
        device: DeviceId,
        error: FeedError,
    },
}

impl<T> Clone for FeedState<T> {
    fn clone(&self) -> Self {
        match self {
            FeedState::NoData => FeedState::NoData,
            FeedState::Loading { device, cached } => FeedState::Loading {
                device: device.clone(),
                cached: cached.clone(),
            },
            FeedState::Ready { device, value } => FeedState::Ready {
                device: device.clone(),
                value: value.clone(),
            },
            FeedState::Failed { device, error } => FeedState::Failed {
                device: device.clone(),
                error: error.clone(),
            },
        }
    }
}

impl<T> FeedState<T> {
    pub fn device(&self) -> Option<&DeviceId> {
        match self {
            FeedState::NoData => None,
            FeedState::Loading { device, .. }
            | FeedState::Ready { device, .. }
            | FeedState::Failed { device, .. } => Some(device),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FeedState::Loading { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FeedState::Failed { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            FeedState::Failed {
                error: FeedError::Unauthorized,
                ..
            }
        )
    }
}

/// Outcome of handing a finished fetch back to its feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    StaleResultDiscarded,
}
