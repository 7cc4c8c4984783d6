//! Fenced code block extraction from model responses
//!
//! The model is instructed to wrap its chart instruction in a fenced
//! block; everything outside the fence is commentary shown to the user
//! as-is. Extraction is tolerant of language tags and missing trailing
//! newlines, and treats a missing or empty block as "no chart requested".

use regex::Regex;
use std::sync::OnceLock;

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"```[A-Za-z0-9_+\-]*[ \t]*\r?\n?((?s:.*?))```").expect("valid fence regex")
    })
}

fn show_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[A-Za-z_][A-Za-z0-9_]*\.show\(\s*\)\s*;?\s*$").expect("valid show regex")
    })
}

/// Extract the first fenced code block from a model response
///
/// The opening fence may carry a language tag (```python, ```json); the
/// tag is not part of the extracted content. Returns `None` when the
/// response has no fence or the block is whitespace-only.
///
/// # Examples
///
/// ```
/// use plotforge::chart::extract_code_block;
///
/// let response = "Here you go:\n```python\nfig = px.bar(df, x=\"a\", y=\"b\")\n```";
/// let block = extract_code_block(response).unwrap();
/// assert!(block.starts_with("fig = px.bar"));
///
/// assert!(extract_code_block("No chart today.").is_none());
/// ```
pub fn extract_code_block(response: &str) -> Option<String> {
    let captures = fence_regex().captures(response)?;
    let block = captures.get(1)?.as_str().trim();
    if block.is_empty() {
        None
    } else {
        Some(block.to_string())
    }
}

/// Remove display-call lines (`fig.show()` and the like) from a block
///
/// Models trained on notebook code habitually append a show call; it has
/// no meaning here, so whole lines consisting of a single `.show()` call
/// are dropped before the block is parsed.
pub fn strip_display_calls(block: &str) -> String {
    block
        .lines()
        .filter(|line| !show_call_regex().is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
