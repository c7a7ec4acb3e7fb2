//! Credentials and `Authorization` header attachment.
//!
//! # Design
//! `Credentials` is an immutable value. A fresh access token produces a new
//! `Credentials` (and a new client) instead of mutating a shared one, so
//! concurrent callers never observe a half-updated token.
//!
//! Which scheme an endpoint gets is decided per endpoint (see
//! `client::Endpoint::auth_mode`), not inferred here.

use std::fmt;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::http::HttpRequest;

/// OAuth bearer token obtained out of band.
///
/// The field names match PayPal's `/v1/oauth2/token` response, so that body
/// can be decoded straight into this type.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(rename = "access_token")]
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type: "Bearer".to_string(),
            expires_in: None,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Client id/secret pair plus the current bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub secret: String,
    pub access_token: AccessToken,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, secret: impl Into<String>, access_token: AccessToken) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
            access_token,
        }
    }

    /// Copy of these credentials carrying a different token.
    pub fn with_access_token(&self, access_token: AccessToken) -> Self {
        Self {
            access_token,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .finish()
    }
}

/// Authorization scheme(s) an endpoint is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Basic base64(client_id:secret)`
    Basic,
    /// `Authorization: Bearer <token>`
    Bearer,
    /// Basic, then Bearer. The header has set-semantics, so the bearer value
    /// is the one that is sent.
    Both,
}

/// Attach the `Authorization` header(s) for `mode` to `request`.
pub fn attach_auth(request: &mut HttpRequest, credentials: &Credentials, mode: AuthMode) {
    match mode {
        AuthMode::Basic => set_basic(request, credentials),
        AuthMode::Bearer => set_bearer(request, credentials),
        AuthMode::Both => {
            set_basic(request, credentials);
            set_bearer(request, credentials);
        }
    }
}

fn set_basic(request: &mut HttpRequest, credentials: &Credentials) {
    let pair = format!("{}:{}", credentials.client_id, credentials.secret);
    let encoded = base64::engine::general_purpose::STANDARD.encode(pair);
    request.set_header("Authorization", format!("Basic {encoded}"));
}

fn set_bearer(request: &mut HttpRequest, credentials: &Credentials) {
    request.set_header(
        "Authorization",
        format!("Bearer {}", credentials.access_token.token),
    );
}
