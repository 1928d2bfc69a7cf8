// View runtime - Single-task event loop driving the coordination view
use crate::application::coordination::{CoordinationView, FetchCommand, FetchCompletion, RenderModel};
use crate::application::feed::{FeedKind, HistoryFeed, Resolution, SnapshotFeed};
use crate::application::selection_store::selection_stream;
use crate::domain::device::{DeviceId, FloorIndex, Selection};
use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;

/// Inputs from the floor plan and the details panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    FloorSelected(FloorIndex),
    DeviceSelected(Option<DeviceId>),
    ViewHistory { device: DeviceId, field: String },
    Retry(FeedKind),
    Refresh,
}

/// Counts of finished fetches, split by whether they reached the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedActivity {
    pub applied: u64,
    pub discarded: u64,
}

/// Cloneable front door to a running view. The loop stops once every
/// handle has been dropped.
#[derive(Clone)]
pub struct ViewHandle {
    events: mpsc::UnboundedSender<ViewEvent>,
    render: watch::Receiver<RenderModel>,
    selection: watch::Receiver<Selection>,
    activity: watch::Receiver<FeedActivity>,
}

impl ViewHandle {
    pub fn select_floor(&self, floor: FloorIndex) {
        self.send(ViewEvent::FloorSelected(floor));
    }

    pub fn select_device(&self, device: Option<DeviceId>) {
        self.send(ViewEvent::DeviceSelected(device));
    }

    pub fn view_history(&self, device: DeviceId, field: impl Into<String>) {
        self.send(ViewEvent::ViewHistory {
            device,
            field: field.into(),
        });
    }

    pub fn retry(&self, kind: FeedKind) {
        self.send(ViewEvent::Retry(kind));
    }

    pub fn refresh(&self) {
        self.send(ViewEvent::Refresh);
    }

    pub fn send(&self, event: ViewEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("View runtime has stopped, dropping event");
        }
    }

    pub fn current(&self) -> RenderModel {
        self.render.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderModel> {
        self.render.clone()
    }

    pub fn subscribe_activity(&self) -> watch::Receiver<FeedActivity> {
        self.activity.clone()
    }

    pub fn render_updates(&self) -> impl Stream<Item = RenderModel> + use<> {
        WatchStream::new(self.render.clone())
    }

    /// Selection changes for the floor-plan renderer to highlight
    pub fn selection_updates(&self) -> impl Stream<Item = Selection> + use<> {
        selection_stream(self.selection.clone())
    }
}

pub struct ViewRuntime {
    view: CoordinationView,
    snapshot_feed: SnapshotFeed,
    history_feed: HistoryFeed,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<FetchCompletion>,
    activity: watch::Sender<FeedActivity>,
}

impl ViewRuntime {
    pub fn new(view: CoordinationView, snapshot_feed: SnapshotFeed, history_feed: HistoryFeed) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (activity, _) = watch::channel(FeedActivity::default());
        Self {
            view,
            snapshot_feed,
            history_feed,
            completions_tx,
            completions_rx,
            activity,
        }
    }

    /// Start the event loop on the current runtime and return its handle
    pub fn spawn(self) -> ViewHandle {
        let (events, events_rx) = mpsc::unbounded_channel();
        let handle = ViewHandle {
            events,
            render: self.view.subscribe(),
            selection: self.view.subscribe_selection(),
            activity: self.activity.subscribe(),
        };
        tokio::spawn(self.run(events_rx));
        handle
    }

    async fn run(mut self, mut events: mpsc::UnboundedReceiver<ViewEvent>) {
        tracing::debug!("View runtime started");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => self.handle_completion(completion),
            }
        }
        tracing::debug!("View runtime stopped");
    }

    fn handle_event(&mut self, event: ViewEvent) {
        tracing::debug!("Handling {:?}", event);
        let commands = match event {
            ViewEvent::FloorSelected(floor) => self.view.select_floor(floor),
            ViewEvent::DeviceSelected(device) => self.view.select_device(device),
            ViewEvent::ViewHistory { device, field } => {
                self.view.view_history(device, field);
                Vec::new()
            }
            ViewEvent::Retry(kind) => self.view.retry(kind).into_iter().collect(),
            ViewEvent::Refresh => self.view.refresh(),
        };

        for command in commands {
            self.dispatch(command);
        }
    }

    fn handle_completion(&mut self, completion: FetchCompletion) {
        let resolution = self.view.apply(completion);
        self.activity.send_modify(|activity| match resolution {
            Resolution::Applied => activity.applied += 1,
            Resolution::StaleResultDiscarded => activity.discarded += 1,
        });
    }

    fn dispatch(&self, command: FetchCommand) {
        let tx = self.completions_tx.clone();
        match command {
            FetchCommand::Snapshot(ticket) => {
                let feed = self.snapshot_feed.clone();
                tokio::spawn(async move {
                    let result = feed.fetch(&ticket.device).await;
                    let _ = tx.send(FetchCompletion::Snapshot { ticket, result });
                });
            }
            FetchCommand::History(ticket) => {
                let feed = self.history_feed.clone();
                tokio::spawn(async move {
                    let result = feed.fetch(&ticket.device).await;
                    let _ = tx.send(FetchCompletion::History { ticket, result });
                });
            }
        }
    }
}
