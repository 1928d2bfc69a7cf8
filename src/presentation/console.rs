// Console rendering of the coordination view for the explore command
use crate::application::coordination::{DetailsView, GraphView, RenderModel, ViewContent};
use crate::domain::telemetry::FieldValue;

/// One human-readable line per render
pub fn describe(render: &RenderModel) -> String {
    let device = render
        .device
        .as_ref()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let head = format!("floor {} | device {} | {:?}", render.floor, device, render.state);

    match &render.content {
        ViewContent::Unauthorized => format!("{} | permission denied", head),
        ViewContent::Panels { details, graph } => {
            format!("{} | {} | {}", head, describe_details(details), describe_graph(graph))
        }
    }
}

fn describe_details(details: &DetailsView) -> String {
    match details {
        DetailsView::NoSelection => "no device selected".to_string(),
        DetailsView::Loading { cached: None, .. } => "loading".to_string(),
        DetailsView::Loading {
            cached: Some(snapshot),
            ..
        } => format!("refreshing {}", format_fields(snapshot.fields.iter())),
        DetailsView::Ready { snapshot, .. } => format_fields(snapshot.fields.iter()),
        DetailsView::FetchFailed { message, .. } => format!("error: {} (retry available)", message),
    }
}

fn describe_graph(graph: &GraphView) -> String {
    match graph {
        GraphView::Placeholder => "no graph".to_string(),
        GraphView::Loading { field, .. } => format!("{}: loading", field),
        GraphView::NoData { field, .. } => format!("{}: no data", field),
        GraphView::Series { field, points, .. } => {
            let last = points.last().map(|p| p.value).unwrap_or_default();
            format!("{}: {} points, last {}", field, points.len(), last)
        }
        GraphView::FetchFailed { field, message, .. } => format!("{}: error: {}", field, message),
    }
}

fn format_fields<'a>(fields: impl Iterator<Item = (&'a String, &'a FieldValue)>) -> String {
    let parts: Vec<String> = fields
        .map(|(name, value)| match value {
            FieldValue::Number(v) => format!("{}={}", name, v),
            FieldValue::Bool(v) => format!("{}={}", name, v),
            FieldValue::Text(v) => format!("{}={}", name, v),
        })
        .collect();
    if parts.is_empty() {
        "no fields".to_string()
    } else {
        parts.join(", ")
    }
}
