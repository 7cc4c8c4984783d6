//! Shared helpers for integration tests

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use plotforge::error::{PlotforgeError, Result};
use plotforge::providers::{CompletionResponse, Message, Provider};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const CSV: &str = "year,country,value\n2010,NL,1\n2015,NL,2\n2020,BE,3\n";

/// Base64-encode CSV text the way the dashboard upload does
pub fn encode_csv(text: &str) -> String {
    BASE64.encode(text.as_bytes())
}

/// Provider stub that replays scripted responses in order
///
/// Fails like an outage once the script runs out.
#[derive(Debug)]
pub struct StubProvider {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for StubProvider {
    async fn complete(&self, _messages: &[Message]) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PlotforgeError::Provider("no scripted response left".to_string()))?;
        Ok(CompletionResponse::new(Message::assistant(response)))
    }

    fn name(&self) -> &str {
        "stub"
    }
}
