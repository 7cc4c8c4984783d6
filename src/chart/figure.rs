//! Figure construction from a validated chart spec
//!
//! Builds plotly-compatible figure JSON (trace list plus layout) directly
//! from dataset columns. Only trusted code touches the data; the spec
//! contributes column names and presentation strings.

use crate::chart::spec::{ChartError, ChartKind, ChartSpec};
use crate::dataset::Dataset;
use serde::Serialize;
use serde_json::{json, Value};

/// A renderable figure: plotly trace objects plus a layout
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    /// Trace objects, one per series
    pub data: Vec<Value>,
    /// Layout object (title, axis labels)
    pub layout: Value,
}

/// Build a figure from a validated spec
///
/// The spec must have passed [`ChartSpec::validate`] against the same
/// dataset; column lookups here rely on it.
///
/// # Errors
///
/// Returns [`ChartError::UnknownColumn`] if a referenced column is
/// missing, which validation normally rules out.
pub fn build_figure(spec: &ChartSpec, dataset: &Dataset) -> Result<Figure, ChartError> {
    let data = match spec.kind {
        ChartKind::Bar | ChartKind::Line | ChartKind::Scatter => xy_traces(spec, dataset)?,
        ChartKind::Histogram => histogram_traces(spec, dataset)?,
        ChartKind::Pie => pie_traces(spec, dataset)?,
        ChartKind::Box => box_traces(spec, dataset)?,
    };

    Ok(Figure {
        data,
        layout: layout(spec),
    })
}

fn column(dataset: &Dataset, name: &str) -> Result<Vec<Value>, ChartError> {
    dataset
        .column_values(name)
        .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))
}

/// Distinct values of a column in first-seen order
fn distinct(values: &[Value]) -> Vec<Value> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}

fn group_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn xy_traces(spec: &ChartSpec, dataset: &Dataset) -> Result<Vec<Value>, ChartError> {
    let x_name = spec.x.as_deref().unwrap_or_default();
    let y_name = spec.y.as_deref().unwrap_or_default();
    let x = column(dataset, x_name)?;
    let y = column(dataset, y_name)?;

    let mode = match spec.kind {
        ChartKind::Line => Some("lines"),
        ChartKind::Scatter => Some("markers"),
        _ => None,
    };

    let trace = |x: Vec<Value>, y: Vec<Value>, name: Option<String>| {
        let mut trace = json!({
            "type": spec.kind.trace_type(),
            "x": x,
            "y": y,
        });
        if let Some(mode) = mode {
            trace["mode"] = json!(mode);
        }
        if let Some(name) = name {
            trace["name"] = json!(name);
        }
        trace
    };

    let Some(color_name) = spec.color.as_deref() else {
        return Ok(vec![trace(x, y, None)]);
    };

    // One trace per distinct color value, rows partitioned by group
    let groups = column(dataset, color_name)?;
    let mut traces = Vec::new();
    for group in distinct(&groups) {
        let mut gx = Vec::new();
        let mut gy = Vec::new();
        for (i, value) in groups.iter().enumerate() {
            if *value == group {
                gx.push(x[i].clone());
                gy.push(y[i].clone());
            }
        }
        traces.push(trace(gx, gy, Some(group_label(&group))));
    }
    Ok(traces)
}

fn histogram_traces(spec: &ChartSpec, dataset: &Dataset) -> Result<Vec<Value>, ChartError> {
    let x_name = spec.x.as_deref().unwrap_or_default();
    let x = column(dataset, x_name)?;
    Ok(vec![json!({
        "type": "histogram",
        "x": x,
    })])
}

fn pie_traces(spec: &ChartSpec, dataset: &Dataset) -> Result<Vec<Value>, ChartError> {
    let labels = column(dataset, spec.x.as_deref().unwrap_or_default())?;
    let values = column(dataset, spec.y.as_deref().unwrap_or_default())?;
    Ok(vec![json!({
        "type": "pie",
        "labels": labels,
        "values": values,
    })])
}

fn box_traces(spec: &ChartSpec, dataset: &Dataset) -> Result<Vec<Value>, ChartError> {
    let y = column(dataset, spec.y.as_deref().unwrap_or_default())?;
    let mut trace = json!({
        "type": "box",
        "y": y,
    });
    if let Some(x_name) = spec.x.as_deref() {
        trace["x"] = json!(column(dataset, x_name)?);
    }
    Ok(vec![trace])
}

fn layout(spec: &ChartSpec) -> Value {
    let mut layout = json!({});
    if let Some(title) = &spec.title {
        layout["title"] = json!({ "text": title });
    }
    if spec.kind != ChartKind::Pie {
        if let Some(x) = &spec.x {
            layout["xaxis"] = json!({ "title": { "text": x } });
        }
        if let Some(y) = &spec.y {
            layout["yaxis"] = json!({ "title": { "text": y } });
        }
    }
    layout
}
