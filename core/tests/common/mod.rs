//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rebrandly_core::{HttpRequest, HttpResponse, Rebrandly, RebrandlyConfig, Transport, TransportError};

pub const API_KEY: &str = "test-api-key";
pub const BASE_URL: &str = "https://api.rebrandly.com/v1";

/// Replays queued outcomes in order; the last one repeats once the queue is
/// down to it. Every request is recorded.
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(outcomes: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        assert!(!outcomes.is_empty(), "script needs at least one outcome");
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn respond(status: u16, body: &str) -> Arc<Self> {
        Self::new(vec![Ok(HttpResponse::new(status, body))])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request was sent")
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            outcomes[0].clone()
        }
    }
}

pub fn config() -> RebrandlyConfig {
    let mut config = RebrandlyConfig::new(API_KEY);
    config.retry_delay = Duration::ZERO;
    config
}

pub fn api(transport: &Arc<ScriptedTransport>) -> Rebrandly {
    Rebrandly::with_transport(&config(), transport.clone()).unwrap()
}

pub fn body_of(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body")).unwrap()
}
