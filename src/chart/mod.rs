//! Chart pipeline: response text to renderable figure
//!
//! This module owns the whole path from a raw model response to a figure:
//! extract the fenced block, strip display calls, parse the block into a
//! declarative spec, validate it against the dataset, and build the
//! figure. No model-authored text is ever executed; a block that does not
//! fit the spec grammar fails the pipeline with a [`ChartError`].

pub mod extractor;
pub mod figure;
pub mod spec;

pub use extractor::{extract_code_block, strip_display_calls};
pub use figure::{build_figure, Figure};
pub use spec::{ChartError, ChartKind, ChartSpec};

use crate::dataset::Dataset;

/// Derive a figure from a model response, if it requests one
///
/// Returns `Ok(None)` when the response carries no code block (the model
/// answered with commentary only). Returns an error when a block is
/// present but cannot be turned into a valid chart; the caller keeps the
/// commentary and reports the failure.
pub fn chart_from_response(response: &str, dataset: &Dataset) -> Result<Option<Figure>, ChartError> {
    let Some(block) = extract_code_block(response) else {
        return Ok(None);
    };

    let block = strip_display_calls(&block);
    if block.is_empty() {
        return Ok(None);
    }

    let spec = ChartSpec::from_block(&block)?;
    spec.validate(dataset)?;
    build_figure(&spec, dataset).map(Some)
}
