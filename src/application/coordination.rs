// Coordination view - Keeps selection, feeds and graph options consistent
use crate::application::feed::{FeedError, FeedKind, FeedState, FetchTicket, Resolution};
use crate::application::feed_slot::FeedSlot;
use crate::application::selection_store::{SelectionChange, SelectionStore};
use crate::domain::device::{DeviceId, FloorIndex, Selection};
use crate::domain::graph::GraphOptions;
use crate::domain::telemetry::{HistorySeries, Snapshot, TimeSeriesPoint};
use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewState {
    NoDeviceSelected,
    DeviceSelectedNoField,
    DeviceSelectedWithField,
}

/// A fetch the caller must run on behalf of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCommand {
    Snapshot(FetchTicket),
    History(FetchTicket),
}

impl FetchCommand {
    pub fn kind(&self) -> FeedKind {
        match self {
            FetchCommand::Snapshot(_) => FeedKind::Snapshot,
            FetchCommand::History(_) => FeedKind::History,
        }
    }

    pub fn ticket(&self) -> &FetchTicket {
        match self {
            FetchCommand::Snapshot(ticket) | FetchCommand::History(ticket) => ticket,
        }
    }
}

#[derive(Debug)]
pub enum FetchCompletion {
    Snapshot {
        ticket: FetchTicket,
        result: Result<Snapshot, FeedError>,
    },
    History {
        ticket: FetchTicket,
        result: Result<HistorySeries, FeedError>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailsView {
    NoSelection,
    Loading {
        device: DeviceId,
        cached: Option<Snapshot>,
    },
    Ready {
        device: DeviceId,
        snapshot: Snapshot,
    },
    FetchFailed {
        device: DeviceId,
        message: String,
        retry: FeedKind,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GraphView {
    Placeholder,
    Loading {
        device: DeviceId,
        field: String,
    },
    NoData {
        device: DeviceId,
        field: String,
    },
    Series {
        device: DeviceId,
        field: String,
        points: Vec<TimeSeriesPoint>,
    },
    FetchFailed {
        device: DeviceId,
        field: String,
        message: String,
        retry: FeedKind,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum ViewContent {
    Unauthorized,
    Panels {
        details: DetailsView,
        graph: GraphView,
    },
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub floor: FloorIndex,
    pub device: Option<DeviceId>,
    pub state: ViewState,
    pub content: ViewContent,
}

impl RenderModel {
    pub fn details(&self) -> Option<&DetailsView> {
        match &self.content {
            ViewContent::Panels { details, .. } => Some(details),
            ViewContent::Unauthorized => None,
        }
    }

    pub fn graph(&self) -> Option<&GraphView> {
        match &self.content {
            ViewContent::Panels { graph, .. } => Some(graph),
            ViewContent::Unauthorized => None,
        }
    }

    /// True once neither panel is waiting on a fetch
    pub fn is_settled(&self) -> bool {
        !matches!(self.details(), Some(DetailsView::Loading { .. }))
            && !matches!(self.graph(), Some(GraphView::Loading { .. }))
    }
}

/// The composition root of the dashboard.
///
/// All mutation goes through `&mut self`, so the view is driven from a
/// single task. Operations that need data return [`FetchCommand`]s; their
/// results come back through [`CoordinationView::apply`].
pub struct CoordinationView {
    selection: SelectionStore,
    snapshot: FeedSlot<Snapshot>,
    history: FeedSlot<HistorySeries>,
    graph: GraphOptions,
    render: watch::Sender<RenderModel>,
}

impl CoordinationView {
    pub fn new(initial_floor: FloorIndex, cache_capacity: usize) -> Self {
        let selection = SelectionStore::new(initial_floor);
        let snapshot = FeedSlot::new("snapshot", cache_capacity);
        let history = FeedSlot::new("history", cache_capacity);
        let graph = GraphOptions::default();
        let initial = compose(&selection.current(), &snapshot.state(), &history.state(), &graph);
        let (render, _) = watch::channel(initial);

        Self {
            selection,
            snapshot,
            history,
            graph,
            render,
        }
    }

    pub fn select_floor(&mut self, floor: FloorIndex) -> Vec<FetchCommand> {
        let change = self.selection.set_floor(floor);
        self.on_selection_change(change)
    }

    pub fn select_device(&mut self, device: Option<DeviceId>) -> Vec<FetchCommand> {
        let change = self.selection.set_device(device);
        self.on_selection_change(change)
    }

    /// Pin `field` of `device` to the graph. History is already fetched per
    /// device, so this never issues a fetch. A request naming a device other
    /// than the selected one is stored but renders as a placeholder.
    pub fn view_history(&mut self, device: DeviceId, field: impl Into<String>) {
        if self.selection.device().as_ref() != Some(&device) {
            tracing::debug!("History requested for {} which is not selected", device);
        }
        self.graph.set_target(device, field);
        self.publish();
    }

    pub fn retry(&mut self, kind: FeedKind) -> Option<FetchCommand> {
        let command = match kind {
            FeedKind::Snapshot => self.snapshot.refresh().map(FetchCommand::Snapshot),
            FeedKind::History => self.history.refresh().map(FetchCommand::History),
        };
        self.publish();
        command
    }

    pub fn refresh(&mut self) -> Vec<FetchCommand> {
        let commands = [
            self.snapshot.refresh().map(FetchCommand::Snapshot),
            self.history.refresh().map(FetchCommand::History),
        ]
        .into_iter()
        .flatten()
        .collect();
        self.publish();
        commands
    }

    pub fn apply(&mut self, completion: FetchCompletion) -> Resolution {
        let resolution = match completion {
            FetchCompletion::Snapshot { ticket, result } => self.snapshot.resolve(&ticket, result),
            FetchCompletion::History { ticket, result } => self.history.resolve(&ticket, result),
        };
        if resolution == Resolution::Applied {
            self.publish();
        }
        resolution
    }

    pub fn state(&self) -> ViewState {
        view_state(&self.selection.current(), &self.graph)
    }

    pub fn selection(&self) -> Selection {
        self.selection.current()
    }

    pub fn graph_options(&self) -> &GraphOptions {
        &self.graph
    }

    pub fn render(&self) -> RenderModel {
        compose(
            &self.selection.current(),
            &self.snapshot.state(),
            &self.history.state(),
            &self.graph,
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderModel> {
        self.render.subscribe()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<Selection> {
        self.selection.subscribe()
    }

    fn on_selection_change(&mut self, change: SelectionChange) -> Vec<FetchCommand> {
        if !change.device_changed {
            if change.floor_changed {
                self.publish();
            }
            return Vec::new();
        }

        // Graph options belong to the previous device's history
        self.graph.clear();

        let device = self.selection.device();
        let commands = [
            self.snapshot.request(device.as_ref()).map(FetchCommand::Snapshot),
            self.history.request(device.as_ref()).map(FetchCommand::History),
        ]
        .into_iter()
        .flatten()
        .collect();

        self.publish();
        commands
    }

    fn publish(&self) {
        self.render.send_replace(self.render());
    }
}

fn view_state(selection: &Selection, graph: &GraphOptions) -> ViewState {
    match &selection.device {
        None => ViewState::NoDeviceSelected,
        Some(device) if graph.target_for(Some(device)).is_some() => {
            ViewState::DeviceSelectedWithField
        }
        Some(_) => ViewState::DeviceSelectedNoField,
    }
}

fn compose(
    selection: &Selection,
    snapshot: &FeedState<Snapshot>,
    history: &FeedState<HistorySeries>,
    graph: &GraphOptions,
) -> RenderModel {
    let content = if snapshot.is_unauthorized() || history.is_unauthorized() {
        ViewContent::Unauthorized
    } else {
        ViewContent::Panels {
            details: details_view(snapshot),
            graph: graph_view(selection.device.as_ref(), history, graph),
        }
    };

    RenderModel {
        floor: selection.floor,
        device: selection.device.clone(),
        state: view_state(selection, graph),
        content,
    }
}

fn details_view(snapshot: &FeedState<Snapshot>) -> DetailsView {
    match snapshot {
        FeedState::NoData => DetailsView::NoSelection,
        FeedState::Loading { device, cached } => DetailsView::Loading {
            device: device.clone(),
            cached: cached.as_deref().cloned(),
        },
        FeedState::Ready { device, value } => DetailsView::Ready {
            device: device.clone(),
            snapshot: (**value).clone(),
        },
        FeedState::Failed { device, error } => DetailsView::FetchFailed {
            device: device.clone(),
            message: error.to_string(),
            retry: FeedKind::Snapshot,
        },
    }
}

fn graph_view(
    selected: Option<&DeviceId>,
    history: &FeedState<HistorySeries>,
    graph: &GraphOptions,
) -> GraphView {
    let (Some(device), Some(field)) = (selected, graph.target_for(selected)) else {
        return GraphView::Placeholder;
    };
    let device = device.clone();
    let field = field.to_string();

    // Only slice history that was fetched for the selected device
    if history.device() != Some(&device) {
        return GraphView::Placeholder;
    }

    let series = match history {
        FeedState::NoData => return GraphView::Placeholder,
        FeedState::Loading { cached: None, .. } => return GraphView::Loading { device, field },
        FeedState::Loading {
            cached: Some(series),
            ..
        }
        | FeedState::Ready { value: series, .. } => series,
        FeedState::Failed { error, .. } => {
            return GraphView::FetchFailed {
                device,
                field,
                message: error.to_string(),
                retry: FeedKind::History,
            };
        }
    };

    let points = series.slice(&field);
    if points.is_empty() {
        GraphView::NoData { device, field }
    } else {
        GraphView::Series {
            device,
            field,
            points,
        }
    }
}
