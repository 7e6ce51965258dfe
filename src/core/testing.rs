// src/core/testing.rs
//! Recording transport used by the unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::api_client::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::{ApiError, Result};

/// Answers requests from a queue, in order, and remembers every request
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(self: Arc<Self>, status: u16, body: &str) -> Arc<Self> {
        self.responses.lock().unwrap().push_back(ApiResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn respond_json(self: Arc<Self>, status: u16, body: serde_json::Value) -> Arc<Self> {
        self.respond(status, &body.to_string())
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> ApiRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request, got {:?}", requests);
        requests.into_iter().next().unwrap()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::Transport(format!("no response queued for {}", path)))
    }
}
