//! Scripted model client for tests.

use crate::ai::Message;
use crate::ai::types::AiError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<String, AiError>>,
    calls: Vec<Vec<Message>>,
}

/// Returns queued responses in order and records every conversation it was sent.
/// Clones share state, so a test can keep a handle after moving one into a client.
#[derive(Clone, Default)]
pub struct MockAiClient {
    state: Arc<Mutex<MockState>>,
}

impl MockAiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for r in responses {
            mock.push_response(r);
        }
        mock
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.state.lock().responses.push_back(Ok(response.into()));
    }

    pub fn push_error(&self, error: AiError) {
        self.state.lock().responses.push_back(Err(error));
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, AiError> {
        let mut state = self.state.lock();
        state.calls.push(messages);
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(AiError::new("MockAiClient: no response queued")))
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    pub fn recorded_calls(&self) -> Vec<Vec<Message>> {
        self.state.lock().calls.clone()
    }
}
