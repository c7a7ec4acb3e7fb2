//! Blocking client for PayPal's billing plan and billing agreement endpoints.
//!
//! # Overview
//! Every operation maps to a single PayPal REST call and runs the same
//! pipeline: build the request, attach authentication, send it, decode the
//! JSON response or map the failure to a `PayPalError`.
//!
//! # Design
//! - `PayPalClient` is immutable. Rotating the bearer token yields a new
//!   client value.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), so callers can run the I/O
//!   themselves. The plain-named method does both through a `Transport`.
//! - Which `Authorization` scheme an endpoint uses is a fixed per-endpoint
//!   table (`Endpoint::auth_mode`).
//! - Nothing is retried or logged as an error internally. Every failure is
//!   returned to the caller.

pub mod auth;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use auth::{AccessToken, AuthMode, Credentials};
pub use client::{Endpoint, PayPalClient};
pub use config::{ClientConfig, Environment};
pub use error::{ApiErrorDetail, ApiErrorResponse, PayPalError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AgreementDetails, Amount, BillingAgreement, BillingAgreementResponse, BillingPlan, ChargeModel,
    CreateBillingPlanResponse, Link, MerchantPreferences, Payer, PayerInfo, PaymentDefinition,
    ShippingAddress,
};
