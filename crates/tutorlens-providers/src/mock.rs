//! Mock backend for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tutorlens_core::traits::{GenerateRequest, GenerateResponse, QuizBackend};

use crate::error::ProviderError;

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
}

/// A backend that answers from a per-model script instead of the network.
///
/// Models without a scripted reply get the default reply.
pub struct MockBackend {
    replies: HashMap<String, MockReply>,
    default_reply: MockReply,
    call_count: AtomicU32,
    /// Model ids requested, in call order.
    calls: Mutex<Vec<String>>,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockBackend {
    /// A mock that returns the same text for every model.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::with_default(MockReply::Text(response.to_string()))
    }

    /// A mock where every model fails unless scripted otherwise.
    pub fn failing(reason: &str) -> Self {
        Self::with_default(MockReply::Fail(reason.to_string()))
    }

    fn with_default(default_reply: MockReply) -> Self {
        Self {
            replies: HashMap::new(),
            default_reply,
            call_count: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
            last_request: Mutex::new(None),
        }
    }

    /// Script a successful reply for one model.
    pub fn reply(mut self, model: &str, text: &str) -> Self {
        self.replies
            .insert(model.to_string(), MockReply::Text(text.to_string()));
        self
    }

    /// Script a failure for one model.
    pub fn fail(mut self, model: &str, reason: &str) -> Self {
        self.replies
            .insert(model.to_string(), MockReply::Fail(reason.to_string()));
        self
    }

    /// Get the number of calls made to this backend.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Models requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Get the last request made to this backend.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl QuizBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.model.clone());
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        match self.replies.get(&request.model).unwrap_or(&self.default_reply) {
            MockReply::Text(text) => Ok(GenerateResponse {
                content: text.clone(),
                model: request.model.clone(),
                latency_ms: 1,
            }),
            MockReply::Fail(reason) => Err(ProviderError::ApiError {
                status: 500,
                message: reason.clone(),
            }
            .into()),
        }
    }
}
