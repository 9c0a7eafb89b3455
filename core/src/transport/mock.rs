//! Scripted in-memory transport for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Transport;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Replays queued responses in order and records every request it sees.
/// Once the queue is empty, further sends fail with a transport error.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with a JSON (or any text) body.
    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .push_back(Ok(HttpResponse::new(status, Vec::new(), body.to_string())));
        self
    }

    pub fn respond_with(self, response: HttpResponse) -> Self {
        self.responses.lock().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted response left".to_string())))
    }
}
