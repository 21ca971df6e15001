//! Mock decision provider for testing and scripted runs
//!
//! Replays a fixed queue of responses and records every request it receives,
//! so tests can assert on the context the agent built.
//!
//! # Example
//!
//! ```rust,ignore
//! use nesplay_providers::mock::{MockProvider, MockResponse};
//!
//! let provider = MockProvider::new()
//!     .with_response(MockResponse::action("TALK"))
//!     .with_response(MockResponse::error("connection refused"));
//! ```

use crate::{DecisionProvider, DecisionRequest};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A scripted answer
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// Raw text returned as-is
    Text(String),
    /// The provider call fails with this message
    Error(String),
}

impl MockResponse {
    pub fn text(text: &str) -> Self {
        MockResponse::Text(text.to_string())
    }

    /// Strict JSON answer choosing `action`
    pub fn action(action: &str) -> Self {
        MockResponse::Text(format!(r#"{{"action": "{}"}}"#, action))
    }

    pub fn error(message: &str) -> Self {
        MockResponse::Error(message.to_string())
    }
}

pub struct MockProvider {
    name: String,
    /// Queue of responses to return (FIFO)
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// All requests received (for verification)
    requests: Arc<Mutex<Vec<DecisionRequest>>>,
    /// Re-queue each response after it is served
    repeat: bool,
    /// Returned once the queue is empty
    default_response: Option<MockResponse>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            repeat: false,
            default_response: None,
        }
    }

    /// Build a provider replaying raw response strings in a loop
    pub fn looping(responses: &[String]) -> Self {
        Self::new()
            .with_responses(responses.iter().map(|r| MockResponse::Text(r.clone())).collect())
            .with_repeat(true)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_response(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        self.responses.lock().unwrap().extend(responses);
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    pub fn get_requests(&self) -> Vec<DecisionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_response(&self) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();
        match responses.pop_front() {
            Some(response) => {
                if self.repeat {
                    responses.push_back(response.clone());
                }
                Some(response)
            }
            None => self.default_response.clone(),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DecisionProvider for MockProvider {
    async fn decide(&self, request: DecisionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);

        match self.next_response() {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Error(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("Mock provider has no responses left"),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
