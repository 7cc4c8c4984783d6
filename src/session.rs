//! Dashboard session state machine
//!
//! A [`Session`] holds everything one dashboard instance accumulates: the
//! active dataset and the chat history. It exposes exactly two
//! transitions, upload and generate, and is independent of the HTTP
//! layer so the whole flow is testable with a fake provider.

use crate::chart::{chart_from_response, Figure};
use crate::config::GenerationConfig;
use crate::dataset::{parse_upload, Dataset, DatasetPreview, UploadStats};
use crate::error::PlotforgeError;
use crate::history::{ChatHistory, ChatTurn};
use crate::prompt;
use crate::providers::Provider;
use serde::Serialize;

/// Observable state of a session
///
/// `Generating` is held only for the duration of a provider exchange;
/// callers serializing access through a lock will observe the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No dataset uploaded yet; generation is refused
    NoDataset,
    /// A dataset is active and generation requests are accepted
    DatasetLoaded,
    /// A generation request is in flight
    Generating,
}

/// Result of an upload attempt
///
/// On failure the previous dataset (if any) stays active, so `stats` and
/// `preview` are absent and `error` explains the rejection.
#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    /// Whether the upload replaced the active dataset
    pub ok: bool,
    /// Statistics of the newly active dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<UploadStats>,
    /// Grid preview of the newly active dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<DatasetPreview>,
    /// Parse error message when the upload was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a generation attempt
///
/// Commentary is the model's full textual response, code block included;
/// the block is rendered as markdown, never executed. The figure is
/// present only when the response contained a valid chart instruction.
/// `error` carries refusals, provider failures, and chart failures.
#[derive(Debug, Serialize)]
pub struct GenerateOutcome {
    /// Model commentary to display in the chat pane
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    /// Renderable figure, when the response produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figure: Option<Figure>,
    /// Failure description, when the request did not fully succeed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Serialized chat history after this request
    pub history: String,
}

/// One dashboard session: active dataset plus chat history
pub struct Session {
    config: GenerationConfig,
    state: SessionState,
    dataset: Option<Dataset>,
    history: ChatHistory,
}

impl Session {
    /// Create a fresh session with no dataset and empty history
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            state: SessionState::NoDataset,
            dataset: None,
            history: ChatHistory::new(),
        }
    }

    /// Current state of the session
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The active dataset, if one has been uploaded
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// The accumulated chat history
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Handle an uploaded file payload
    ///
    /// A successful parse replaces the active dataset wholesale; a failed
    /// parse leaves the session exactly as it was, including any
    /// previously active dataset.
    pub fn handle_upload(&mut self, contents: &str, filename: &str) -> UploadOutcome {
        match parse_upload(contents, filename) {
            Ok(dataset) => {
                let stats = dataset.stats();
                let preview = dataset.preview(self.config.grid_rows);
                tracing::info!(
                    records = stats.records,
                    columns = stats.columns,
                    filename = %filename,
                    "Dataset uploaded"
                );
                self.dataset = Some(dataset);
                self.state = SessionState::DatasetLoaded;
                UploadOutcome {
                    ok: true,
                    stats: Some(stats),
                    preview: Some(preview),
                    error: None,
                }
            }
            Err(e) => {
                let error = PlotforgeError::UploadParse(e.to_string());
                tracing::warn!(filename = %filename, "Upload rejected: {}", error);
                UploadOutcome {
                    ok: false,
                    stats: None,
                    preview: None,
                    error: Some(error.to_string()),
                }
            }
        }
    }

    /// Run one generation request against the injected provider
    ///
    /// Refuses without calling the provider when no dataset is active or
    /// the request is blank. The user/assistant turn pair is appended to
    /// the history only once the provider exchange completes; a chart
    /// failure after that point keeps both the history and the model's
    /// commentary.
    pub async fn generate(&mut self, request: &str, provider: &dyn Provider) -> GenerateOutcome {
        let request = request.trim();

        if request.is_empty() {
            return self.refusal("Describe the chart you want before generating.");
        }
        let Some(dataset) = self.dataset.clone() else {
            return self.refusal("Upload a dataset before generating a chart.");
        };

        let messages = prompt::compose(&dataset, &self.history, request, self.config.preview_rows);

        self.state = SessionState::Generating;
        let completion = provider.complete(&messages).await;
        self.state = SessionState::DatasetLoaded;

        let response = match completion {
            Ok(completion) => completion.message.content,
            Err(e) => {
                tracing::error!(provider = provider.name(), "Generation failed: {}", e);
                return GenerateOutcome {
                    commentary: None,
                    figure: None,
                    error: Some(format!("The model request failed: {}", e)),
                    history: self.history.serialize(),
                };
            }
        };

        // The exchange completed; it belongs to the history no matter
        // what the chart pipeline does with it.
        self.history.push_turn(ChatTurn::user(request));
        self.history.push_turn(ChatTurn::assistant(response.clone()));

        let (figure, error) = match chart_from_response(&response, &dataset) {
            Ok(figure) => (figure, None),
            Err(e) => {
                let error = PlotforgeError::ChartExecution(e.to_string());
                tracing::warn!("{}", error);
                (None, Some(error.to_string()))
            }
        };

        GenerateOutcome {
            commentary: Some(response),
            figure,
            error,
            history: self.history.serialize(),
        }
    }

    fn refusal(&self, message: &str) -> GenerateOutcome {
        GenerateOutcome {
            commentary: None,
            figure: None,
            error: Some(PlotforgeError::EmptyInput(message.to_string()).to_string()),
            history: self.history.serialize(),
        }
    }
}
