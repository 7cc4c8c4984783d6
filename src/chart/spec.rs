//! Chart specification parsing and validation
//!
//! A model response's code block is narrowed down to a small, declarative
//! [`ChartSpec`] before anything is rendered. Two surface forms are
//! accepted: a JSON object (`{"chart": "bar", "x": ..., "y": ...}`) and a
//! single plotly-express assignment (`fig = px.bar(df, x="...", y="...")`).
//! Anything outside that grammar is rejected, so model output can never
//! execute as code.

use crate::dataset::Dataset;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors produced while parsing or validating a chart instruction
#[derive(Error, Debug)]
pub enum ChartError {
    /// Block was neither a JSON spec nor a single plotly-express assignment
    #[error("unsupported chart instruction: {0}")]
    UnsupportedCode(String),

    /// JSON spec was present but structurally invalid
    #[error("invalid chart spec: {0}")]
    InvalidSpec(String),

    /// Chart kind is not one of the supported kinds
    #[error("unsupported chart kind: {0}")]
    UnsupportedKind(String),

    /// Spec references a column the dataset does not have
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A required axis is missing for the requested kind
    #[error("chart kind {kind} requires the {axis} axis")]
    MissingAxis {
        /// Requested chart kind
        kind: ChartKind,
        /// Name of the missing axis
        axis: &'static str,
    },
}

/// Supported chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Histogram,
    Pie,
    #[serde(rename = "box")]
    Box,
}

impl ChartKind {
    /// Parse a kind from its lowercase name
    pub fn parse(name: &str) -> Result<Self, ChartError> {
        match name {
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "scatter" => Ok(Self::Scatter),
            "histogram" => Ok(Self::Histogram),
            "pie" => Ok(Self::Pie),
            "box" => Ok(Self::Box),
            other => Err(ChartError::UnsupportedKind(other.to_string())),
        }
    }

    /// The plotly trace type this kind renders as
    pub fn trace_type(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line | Self::Scatter => "scatter",
            Self::Histogram => "histogram",
            Self::Pie => "pie",
            Self::Box => "box",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Scatter => "scatter",
            Self::Histogram => "histogram",
            Self::Pie => "pie",
            Self::Box => "box",
        };
        write!(f, "{}", name)
    }
}

/// Declarative chart description parsed from a model response
///
/// Only column names and presentation strings survive parsing; the
/// renderer resolves columns against the dataset itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart kind
    #[serde(rename = "chart")]
    pub kind: ChartKind,
    /// Column plotted on the x axis (category names for pie)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Column plotted on the y axis (slice values for pie)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Column used to split rows into colored series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Chart title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^fig\s*=\s*px\.([a-z_]+)\(\s*df\s*(?:,\s*(?s:(.*)))?\)\s*$")
            .expect("valid assignment regex")
    })
}

fn kwarg_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([a-z_]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid kwarg regex")
    })
}

impl ChartSpec {
    /// Parse a code block into a chart spec
    ///
    /// Blocks starting with `{` parse as a JSON spec; anything else must
    /// reduce to a single `fig = px.<kind>(df, ...)` assignment once
    /// import lines are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError`] when the block matches neither form. Parsing
    /// fails closed: an unrecognized construct is an error, never a
    /// best-effort chart.
    pub fn from_block(block: &str) -> Result<Self, ChartError> {
        let block = block.trim();
        if block.starts_with('{') {
            return serde_json::from_str(block).map_err(|e| ChartError::InvalidSpec(e.to_string()));
        }
        Self::from_assignment(block)
    }

    fn from_assignment(block: &str) -> Result<Self, ChartError> {
        let statements: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty()
                    && !line.starts_with("import ")
                    && !line.starts_with("from ")
                    && !line.starts_with('#')
            })
            .collect();

        let statement = match statements.as_slice() {
            [single] => *single,
            _ => {
                return Err(ChartError::UnsupportedCode(
                    "expected a single chart assignment".to_string(),
                ))
            }
        };

        let captures = assignment_regex()
            .captures(statement)
            .ok_or_else(|| ChartError::UnsupportedCode(truncate(statement)))?;

        let kind = ChartKind::parse(&captures[1])?;

        let mut spec = Self {
            kind,
            x: None,
            y: None,
            color: None,
            title: None,
        };

        if let Some(args) = captures.get(2) {
            for kwarg in kwarg_regex().captures_iter(args.as_str()) {
                let value = kwarg
                    .get(2)
                    .or_else(|| kwarg.get(3))
                    .map(|m| m.as_str().to_string());
                match &kwarg[1] {
                    "x" | "names" => spec.x = value,
                    "y" | "values" => spec.y = value,
                    "color" => spec.color = value,
                    "title" => spec.title = value,
                    // Other keyword arguments (labels, template, ...) are
                    // presentation hints we do not honor.
                    _ => {}
                }
            }
        }

        Ok(spec)
    }

    /// Validate the spec against the active dataset
    ///
    /// Checks that each required axis is present for the kind and that
    /// every referenced column exists.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError`] naming the missing axis or unknown column.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), ChartError> {
        let require = |axis: &'static str, value: &Option<String>| match value {
            Some(_) => Ok(()),
            None => Err(ChartError::MissingAxis {
                kind: self.kind,
                axis,
            }),
        };

        match self.kind {
            ChartKind::Bar | ChartKind::Line | ChartKind::Scatter => {
                require("x", &self.x)?;
                require("y", &self.y)?;
            }
            ChartKind::Histogram => require("x", &self.x)?,
            ChartKind::Pie => {
                require("x", &self.x)?;
                require("y", &self.y)?;
            }
            ChartKind::Box => require("y", &self.y)?,
        }

        for column in [&self.x, &self.y, &self.color].into_iter().flatten() {
            if dataset.column_index(column).is_none() {
                return Err(ChartError::UnknownColumn(column.clone()));
            }
        }

        Ok(())
    }
}

fn truncate(statement: &str) -> String {
    const MAX: usize = 120;
    if statement.len() <= MAX {
        statement.to_string()
    } else {
        format!("{}...", &statement[..MAX])
    }
}
