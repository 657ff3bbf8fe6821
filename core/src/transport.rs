//! Blocking HTTP transport backed by `ureq`.
//!
//! Status codes are returned as data (`http_status_as_error(false)`): the API
//! signals failures through an `error` field in the body, which the client
//! inspects. Only connection problems and bodies that are not JSON become
//! `TransportError`s.

use std::fmt;

use serde_json::Value;
use tracing::trace;
use ureq::Agent;

use crate::config::ClientConfig;
use crate::http::{ApiRequest, HttpMethod, Transport, TransportError};

#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    base_url: String,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn get(&self, request: &ApiRequest) -> Result<Value, TransportError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.agent.get(&url),
        };
        builder = builder.header("user-agent", &self.user_agent);
        for (key, value) in &request.query {
            builder = builder.query(key, value.to_wire_string());
        }

        let mut response = builder
            .call()
            .map_err(|e| TransportError::new(format!("request to {url} failed: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;
        trace!(%url, status, bytes = body.len(), "response received");

        serde_json::from_str(&body).map_err(|e| {
            TransportError::non_retryable(format!("response from {url} (HTTP {status}) is not JSON: {e}"))
        })
    }
}
