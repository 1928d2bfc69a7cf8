// Feed slot - Per-device cache and supersession guard for one feed kind
use crate::application::feed::{FeedError, FeedState, FetchTicket, Resolution};
use crate::domain::device::DeviceId;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::watch;

/// Bookkeeping for one feed: which fetch is current, which fetches are
/// still running, and the last good value per device. The cache keeps the
/// most recently used devices; a capacity of zero disables it.
///
/// At most one fetch per device is outstanding. Asking for a device whose
/// fetch is already running adopts that fetch instead of issuing another.
pub struct FeedSlot<T> {
    name: &'static str,
    current: Option<FetchTicket>,
    in_flight: HashMap<DeviceId, u64>,
    next_generation: u64,
    cache: Option<LruCache<DeviceId, Arc<T>>>,
    state: watch::Sender<FeedState<T>>,
}

impl<T> FeedSlot<T> {
    pub fn new(name: &'static str, cache_capacity: usize) -> Self {
        let (state, _) = watch::channel(FeedState::NoData);
        Self {
            name,
            current: None,
            in_flight: HashMap::new(),
            next_generation: 0,
            cache: NonZeroUsize::new(cache_capacity).map(LruCache::new),
            state,
        }
    }

    /// Point the slot at `device`. Returns a ticket when a new fetch must
    /// be started; `None` when there is nothing to fetch or one is running.
    pub fn request(&mut self, device: Option<&DeviceId>) -> Option<FetchTicket> {
        let Some(device) = device else {
            self.current = None;
            self.publish(FeedState::NoData);
            return None;
        };

        let cached = self.cache.as_mut().and_then(|cache| cache.get(device).cloned());
        self.publish(FeedState::Loading {
            device: device.clone(),
            cached,
        });

        if let Some(generation) = self.in_flight.get(device) {
            tracing::debug!(
                "{} fetch for {} already in flight (generation {}), adopting it",
                self.name,
                device,
                generation
            );
            self.current = Some(FetchTicket {
                device: device.clone(),
                generation: *generation,
            });
            return None;
        }

        self.next_generation += 1;
        let ticket = FetchTicket {
            device: device.clone(),
            generation: self.next_generation,
        };
        self.in_flight.insert(device.clone(), ticket.generation);
        self.current = Some(ticket.clone());
        Some(ticket)
    }

    /// Re-request whatever device the slot currently points at
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        let device = self.current.as_ref().map(|t| t.device.clone());
        match device {
            Some(device) => self.request(Some(&device)),
            None => None,
        }
    }

    /// Accept the result of a finished fetch. Successful results always
    /// refresh the cache; they only become visible if `ticket` is current.
    pub fn resolve(&mut self, ticket: &FetchTicket, result: Result<T, FeedError>) -> Resolution {
        if self.in_flight.get(&ticket.device) == Some(&ticket.generation) {
            self.in_flight.remove(&ticket.device);
        }

        let result = result.map(Arc::new);
        if let Ok(value) = &result {
            self.remember(ticket.device.clone(), value.clone());
        }

        if self.current.as_ref() != Some(ticket) {
            tracing::debug!(
                "Discarding stale {} result for {} (generation {})",
                self.name,
                ticket.device,
                ticket.generation
            );
            return Resolution::StaleResultDiscarded;
        }

        let device = ticket.device.clone();
        match result {
            Ok(value) => self.publish(FeedState::Ready { device, value }),
            Err(error) => {
                tracing::warn!("{} fetch for {} failed: {}", self.name, device, error);
                self.publish(FeedState::Failed { device, error });
            }
        }
        Resolution::Applied
    }

    pub fn state(&self) -> FeedState<T> {
        self.state.borrow().clone()
    }

    pub fn cached(&self, device: &DeviceId) -> Option<Arc<T>> {
        self.cache.as_ref().and_then(|cache| cache.peek(device).cloned())
    }

    pub fn is_in_flight(&self, device: &DeviceId) -> bool {
        self.in_flight.contains_key(device)
    }

    fn remember(&mut self, device: DeviceId, value: Arc<T>) {
        if let Some(cache) = self.cache.as_mut() {
            cache.put(device, value);
        }
    }

    fn publish(&self, state: FeedState<T>) {
        self.state.send_replace(state);
    }
}
