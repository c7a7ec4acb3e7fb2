//! Executing `HttpRequest`s over the network.
//!
//! # Design
//! `Transport` is the only place I/O happens. The default implementation
//! wraps a `ureq` agent with status-as-error disabled, so 4xx/5xx responses
//! come back as data and status interpretation stays in `decode`. Any
//! failure to obtain a response at all is a `PayPalError::Transport`; nothing
//! is retried.

use std::time::Duration;

use tracing::{debug, trace};

use crate::error::PayPalError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, PayPalError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, PayPalError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds the whole round-trip, including connect.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, PayPalError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Patch => {
                let mut builder = match request.method {
                    HttpMethod::Patch => self.agent.patch(request.url.as_str()),
                    _ => self.agent.post(request.url.as_str()),
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| match e {
            // Raised before anything is sent: bad URI or header.
            ureq::Error::Http(_) | ureq::Error::BadUri(_) => {
                PayPalError::RequestConstruction(e.to_string())
            }
            other => PayPalError::transport(other),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // Non-UTF-8 bytes are replaced rather than failing the call, so that
        // `decode` still classifies the response by status.
        let bytes = response
            .body_mut()
            .read_to_vec()
            .map_err(PayPalError::transport)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!(status, "received response");
        trace!(bytes = body.len(), "response body");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
