//! Transport client for the Rebrandly REST API.
//!
//! # Design
//! `RebrandlyClient` is the single point of outbound traffic. Every verb goes
//! through `dispatch`, which is split the same way for all of them:
//! `build_request` produces an `HttpRequest`, the [`Transport`] executes it,
//! and `parse_response` maps the `HttpResponse` to decoded JSON or an error.
//!
//! Paths are given as segments (`&["links", id]`). Each segment is
//! percent-encoded on its own, so an id can never add path components or a
//! query string.
//!
//! Only failures to get a response (and 5xx replies) are retried. A 4xx or an
//! undecodable body is final on the first attempt: the server received the
//! request and repeating it yields the same answer.
//!
//! The client keeps no per-call state; clones share one transport.

use std::sync::Arc;
use std::thread;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::RebrandlyConfig;
use crate::error::{Missing, RebrandlyError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};

#[derive(Clone)]
pub struct RebrandlyClient {
    base_url: url::Url,
    api_key: String,
    default_domain: Option<String>,
    retries: u32,
    retry_delay: std::time::Duration,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RebrandlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RebrandlyClient")
            .field("base_url", &self.base_url.as_str())
            .field("default_domain", &self.default_domain)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

impl RebrandlyClient {
    /// Client backed by a blocking `ureq` transport using the configured
    /// timeout.
    pub fn new(config: &RebrandlyConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: &RebrandlyConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let base_url = url::Url::parse(&config.base_url)
            .map_err(|e| RebrandlyError::Config(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RebrandlyError::Config(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            default_domain: config.default_domain.clone(),
            retries: config.retries,
            retry_delay: config.retry_delay,
            transport,
        })
    }

    pub fn default_domain(&self) -> Option<&str> {
        self.default_domain.as_deref()
    }

    pub fn get(&self, path: &[&str], query: &[(String, String)]) -> Result<Value> {
        self.dispatch(HttpMethod::Get, path, query, None)
    }

    /// POST with an optional JSON body. Relation endpoints take no body.
    pub fn post(&self, path: &[&str], body: Option<&Value>) -> Result<Value> {
        self.dispatch(HttpMethod::Post, path, &[], body)
    }

    pub fn put(&self, path: &[&str], body: &Value) -> Result<Value> {
        self.dispatch(HttpMethod::Put, path, &[], Some(body))
    }

    pub fn delete(&self, path: &[&str]) -> Result<Value> {
        self.dispatch(HttpMethod::Delete, path, &[], None)
    }

    fn dispatch(
        &self,
        method: HttpMethod,
        path: &[&str],
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let request = self.build_request(method, path, query, body)?;
        let attempts = self.retries.saturating_add(1);
        let mut attempt = 1;

        loop {
            debug!(method = method.as_str(), url = %request.url, attempt, "sending request");
            let outcome = match self.transport.execute(&request) {
                Ok(response) => parse_response(response),
                Err(e) => Err(RebrandlyError::Network(e.to_string())),
            };

            match outcome {
                Err(err) if err.is_retryable() && attempt < attempts => {
                    warn!(
                        method = method.as_str(),
                        url = %request.url,
                        attempt,
                        error = %err,
                        "request failed, retrying"
                    );
                    if !self.retry_delay.is_zero() {
                        thread::sleep(self.retry_delay);
                    }
                    attempt += 1;
                }
                Err(err) => {
                    debug!(method = method.as_str(), url = %request.url, status = ?err.status(), error = %err, "request failed");
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    /// Build the request for `path`, appended segment by segment to the base
    /// URL. Empty, `.` and `..` segments are rejected with `InvalidInput`.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &[&str],
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<HttpRequest> {
        if let Some(segment) = path
            .iter()
            .find(|segment| matches!(segment.trim(), "" | "." | ".."))
        {
            return Err(RebrandlyError::InvalidInput(format!(
                "'{segment}' is not a valid identifier"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RebrandlyError::Config(format!("base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RebrandlyError::Serialization(e.to_string()))?;

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers: vec![
                ("apikey".to_string(), self.api_key.clone()),
                ("content-type".to_string(), "application/json".to_string()),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }
}

/// Map a raw response to decoded JSON or the matching error. The status is
/// looked at first; the body is only decoded afterwards.
pub fn parse_response(response: HttpResponse) -> Result<Value> {
    match response.status {
        401 => Err(RebrandlyError::InvalidApiKey),
        404 => Err(RebrandlyError::NotFound(Missing::Unknown)),
        status @ 400..=499 => {
            let context = match decode_body(&response.body) {
                Ok(value @ Value::Object(_)) => value,
                _ => Value::Object(Map::new()),
            };
            let message = context
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("API Error")
                .to_string();
            Err(RebrandlyError::Api {
                message,
                status,
                context,
            })
        }
        status @ 500..=599 => Err(RebrandlyError::Network(format!(
            "server responded with status {status}"
        ))),
        _ => decode_body(&response.body),
    }
}

/// An empty body decodes to an empty object.
fn decode_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
        .map_err(|e| RebrandlyError::InvalidResponse(format!("Invalid JSON response: {e}")))
}
