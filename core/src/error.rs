//! Error types for the PayPal billing client.
//!
//! # Design
//! Each stage of the request pipeline owns one variant, so a caller can tell
//! "never left the process" (`RequestConstruction`, `Serialization`) from
//! "never reached PayPal" (`Transport`) from "PayPal said no" (`Api`,
//! `HttpStatus`) from "PayPal said yes but the body is unusable"
//! (`ResponseDecode`, `AgreementNotExecuted`).
//!
//! `Api` is only produced when the error body decodes into PayPal's error
//! shape. Any other non-2xx response lands in `HttpStatus` with the raw body.

use serde::{Deserialize, Serialize};

use crate::types::Link;

/// Boxed cause of a network-level failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by every `PayPalClient` operation.
#[derive(Debug, thiserror::Error)]
pub enum PayPalError {
    /// The request could not be assembled (bad base URL, empty identifier).
    #[error("invalid request: {0}")]
    RequestConstruction(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced an HTTP response (DNS, refused, timeout).
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// Non-2xx response whose body is not a PayPal error document.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Non-2xx response carrying a PayPal error document.
    #[error("PayPal API error (HTTP {status}): {error}")]
    Api { status: u16, error: ApiErrorResponse },

    /// 2xx response whose body does not match the expected type.
    #[error("response decoding failed: {message}")]
    ResponseDecode { message: String, body: String },

    /// PayPal accepted the execute call but returned no agreement id.
    #[error("Unable to execute agreement with token={token}")]
    AgreementNotExecuted { token: String },

    /// Missing or malformed client configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PayPalError {
    /// Wrap any transport-level failure.
    pub fn transport<E>(cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        PayPalError::Transport(cause.into())
    }

    /// HTTP status of the response that caused this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            PayPalError::HttpStatus { status, .. } | PayPalError::Api { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// The decoded PayPal error document, if there was one.
    pub fn api_error(&self) -> Option<&ApiErrorResponse> {
        match self {
            PayPalError::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// PayPal's error document, e.g.
/// `{"name":"VALIDATION_ERROR","message":"Invalid request","debug_id":"..."}`.
///
/// `name` is required: a body without it is not treated as a PayPal error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{name}: {message}")]
pub struct ApiErrorResponse {
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub debug_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub information_link: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl ApiErrorResponse {
    /// PayPal's machine-readable error name, e.g. `VALIDATION_ERROR`.
    pub fn code(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One field-level problem inside an `ApiErrorResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub issue: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreement_not_executed_message_names_token() {
        let err = PayPalError::AgreementNotExecuted {
            token: "T1".to_string(),
        };
        assert_eq!(err.to_string(), "Unable to execute agreement with token=T1");
    }

    #[test]
    fn api_error_exposes_code_and_message() {
        let body: ApiErrorResponse = serde_json::from_str(
            r#"{"name":"VALIDATION_ERROR","message":"Invalid plan","details":[{"field":"name","issue":"required"}]}"#,
        )
        .unwrap();
        let err = PayPalError::Api {
            status: 400,
            error: body,
        };
        assert_eq!(err.status(), Some(400));
        let api = err.api_error().unwrap();
        assert_eq!(api.code(), "VALIDATION_ERROR");
        assert_eq!(api.message(), "Invalid plan");
        assert_eq!(api.details[0].field, "name");
        assert!(err.to_string().contains("VALIDATION_ERROR: Invalid plan"));
    }

    #[test]
    fn error_body_without_name_is_rejected() {
        let result: Result<ApiErrorResponse, _> =
            serde_json::from_str(r#"{"message":"something"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = PayPalError::transport(io);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.status(), None);
    }
}
