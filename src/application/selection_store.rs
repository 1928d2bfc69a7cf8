// Selection store - Session-scoped floor and device selection
use crate::domain::device::{DeviceId, FloorIndex, Selection};
use futures::Stream;
use tokio::sync::watch;

/// What a single mutation of the store actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub floor_changed: bool,
    pub device_changed: bool,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        !self.floor_changed && !self.device_changed
    }
}

/// Holds the current [`Selection`] and broadcasts every change to
/// subscribers before the mutating call returns.
pub struct SelectionStore {
    selection: watch::Sender<Selection>,
}

impl SelectionStore {
    pub fn new(floor: FloorIndex) -> Self {
        let (selection, _) = watch::channel(Selection::new(floor));
        Self { selection }
    }

    pub fn floor(&self) -> FloorIndex {
        self.selection.borrow().floor
    }

    pub fn device(&self) -> Option<DeviceId> {
        self.selection.borrow().device.clone()
    }

    pub fn current(&self) -> Selection {
        self.selection.borrow().clone()
    }

    /// Switch floors. Device selections are floor-scoped, so a different
    /// floor also drops the selected device in the same update.
    pub fn set_floor(&self, floor: FloorIndex) -> SelectionChange {
        let mut change = SelectionChange::default();
        self.selection.send_if_modified(|selection| {
            if selection.floor == floor {
                return false;
            }
            selection.floor = floor;
            change.floor_changed = true;
            if selection.device.take().is_some() {
                change.device_changed = true;
            }
            true
        });

        if !change.is_empty() {
            tracing::debug!("Floor changed to {} (device cleared: {})", floor, change.device_changed);
        }
        change
    }

    pub fn set_device(&self, device: Option<DeviceId>) -> SelectionChange {
        let mut change = SelectionChange::default();
        self.selection.send_if_modified(|selection| {
            if selection.device == device {
                return false;
            }
            tracing::debug!("Device changed from {:?} to {:?}", selection.device, device);
            selection.device = device;
            change.device_changed = true;
            true
        });
        change
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.selection.subscribe()
    }

    /// Stream of selections, starting with the current one
    pub fn changes(&self) -> impl Stream<Item = Selection> + use<> {
        selection_stream(self.subscribe())
    }
}

/// Turn a selection receiver into a stream that yields the current value
/// and then every subsequent change until the store is dropped.
pub fn selection_stream(mut rx: watch::Receiver<Selection>) -> impl Stream<Item = Selection> {
    async_stream::stream! {
        let initial = rx.borrow_and_update().clone();
        yield initial;
        while rx.changed().await.is_ok() {
            let selection = rx.borrow_and_update().clone();
            yield selection;
        }
    }
}
