//! Shared test utilities
//!
//! Provides a scriptable in-memory provider so the generation flow can be
//! tested without network access.

use crate::error::{PlotforgeError, Result};
use crate::providers::{CompletionResponse, Message, Provider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Provider fake that replays queued responses in order
///
/// Each `complete` call pops the next queued response; once the queue is
/// drained further calls fail like a provider outage would. The messages
/// of the most recent call are retained for assertions.
#[derive(Debug)]
pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    last_messages: Mutex<Vec<Message>>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a provider that replays `responses` in order
    pub fn new(responses: Vec<impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            last_messages: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `complete` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages passed to the most recent `complete` call
    pub fn last_messages(&self) -> Vec<Message> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PlotforgeError::Provider("no scripted response left".to_string()))?;

        Ok(CompletionResponse::new(Message::assistant(response)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_replays_in_order() {
        let provider = MockProvider::new(vec!["one", "two"]);
        let messages = vec![Message::user("hi")];

        let first = provider.complete(&messages).await.unwrap();
        assert_eq!(first.message.content, "one");
        let second = provider.complete(&messages).await.unwrap();
        assert_eq!(second.message.content, "two");
        assert_eq!(provider.call_count(), 2);

        assert!(provider.complete(&messages).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_provider_records_messages() {
        let provider = MockProvider::new(vec!["ok"]);
        let messages = vec![Message::system("sys"), Message::user("question")];
        provider.complete(&messages).await.unwrap();
        assert_eq!(provider.last_messages(), messages);
    }
}
