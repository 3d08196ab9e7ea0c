//! Executing `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the single I/O seam of the core. Non-2xx responses come
//! back as data so `ApiClient::parse_*` interprets every status; only a
//! missing response becomes `ApiError::Network`. There is no retry and no
//! timeout policy beyond the agent's defaults.

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.path, "sending request");

        let HttpRequest { method, path, headers, body } = request;
        let result = match method {
            HttpMethod::Get => {
                let mut req = self.agent.get(&path);
                for (name, value) in &headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                req.call()
            }
            HttpMethod::Delete => {
                let mut req = self.agent.delete(&path);
                for (name, value) in &headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                req.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut req = if method == HttpMethod::Post {
                    self.agent.post(&path)
                } else {
                    self.agent.put(&path)
                };
                for (name, value) in &headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => req.send(body.as_bytes()),
                    None => req.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!(status, "received response");
        Ok(HttpResponse { status, headers, body })
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedTransport;

#[cfg(any(test, feature = "test-util"))]
mod scripted {
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    use tracing::debug;

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpRequest, HttpResponse};

    /// In-memory transport replaying canned responses in order and recording
    /// every request it was asked to execute. Test helper, compiled for this
    /// crate's tests and for dependents that enable the `test-util` feature.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response with `status` and `body`.
        pub fn respond(&self, status: u16, body: &str) -> &Self {
            self.push(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }))
        }

        /// Queue a connectivity failure.
        pub fn fail(&self, reason: &str) -> &Self {
            self.push(Err(ApiError::Network(reason.to_string())))
        }

        fn push(&self, outcome: Result<HttpResponse, ApiError>) -> &Self {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(outcome);
            self
        }

        /// Requests executed so far, oldest first.
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Responses queued but not consumed yet.
        pub fn pending(&self) -> usize {
            self.responses.lock().unwrap_or_else(PoisonError::into_inner).len()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            debug!(method = request.method.as_str(), url = %request.path, "scripted request");
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted response left".to_string())))
        }
    }
}
