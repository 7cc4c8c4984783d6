//! Prompt composition for chart generation
//!
//! Builds the structured message list sent to the provider: a fixed
//! system directive carrying the dataset head, the full chat history
//! oldest first, and the new user request. Precondition guards (dataset
//! present, non-blank request) live in the session; this module only
//! assembles messages and therefore takes the dataset by reference.

use crate::dataset::Dataset;
use crate::history::{ChatHistory, Role};
use crate::providers::Message;

/// Fixed system directive, completed with the dataset head at compose time
///
/// The directive pins down the output contract: a single fenced code
/// block holding either a JSON chart spec or one plotly-express
/// assignment, so the extractor downstream has a grammar to validate
/// against.
const SYSTEM_DIRECTIVE: &str = "You are a data visualization expert and only produce Plotly \
charts. Here are the first rows of the uploaded data:\n\n{data}\n\nThe full dataset is available \
to the chart builder as `df`. Respond with a short explanation and exactly one fenced code block \
containing either a JSON object like {\"chart\": \"bar\", \"x\": \"column\", \"y\": \"column\"} \
or a single assignment of the form `fig = px.bar(df, x=\"column\", y=\"column\")`. Supported \
chart kinds are bar, line, scatter, histogram, pie, and box. Follow the user's instructions when \
creating the graph.";

/// Build the complete message list for one generation request
///
/// # Arguments
///
/// * `dataset` - The active dataset; its first `preview_rows` rows are
///   rendered as text into the system directive
/// * `history` - Prior turns, included oldest first
/// * `request` - The new user instruction
/// * `preview_rows` - Number of head rows included in the directive
pub fn compose(
    dataset: &Dataset,
    history: &ChatHistory,
    request: &str,
    preview_rows: usize,
) -> Vec<Message> {
    let system = SYSTEM_DIRECTIVE.replace("{data}", &dataset.head_text(preview_rows));

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system));

    for turn in history.turns() {
        messages.push(match turn.role {
            Role::User => Message::user(turn.content.clone()),
            Role::Assistant => Message::assistant(turn.content.clone()),
        });
    }

    messages.push(Message::user(request.to_string()));
    messages
}
