//! Plotforge - LLM-assisted chart builder dashboard
//!
//! This library provides the core functionality for the Plotforge
//! dashboard: dataset upload and parsing, chat-driven chart generation
//! against pluggable LLM providers, a constrained chart-spec pipeline,
//! and the HTTP layer that serves the single-page dashboard.
//!
//! Model output is never executed. A response's fenced code block is
//! parsed into a declarative chart spec, validated against the uploaded
//! dataset, and rendered by trusted code; anything outside that grammar
//! is rejected with the model's commentary preserved.

pub mod chart;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod history;
pub mod prompt;
pub mod providers;
pub mod server;
pub mod session;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::{PlotforgeError, Result};
pub use session::{GenerateOutcome, Session, SessionState, UploadOutcome};
