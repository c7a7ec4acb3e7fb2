//! Billing plan and billing agreement operations.
//!
//! # Design
//! `PayPalClient` holds the API base, immutable credentials and a
//! `Transport`. Each operation is split the same way:
//! - `build_*` produces an authenticated `HttpRequest` without I/O,
//! - `parse_*` consumes an `HttpResponse`,
//! - the plain-named method runs both through the client's transport.
//!
//! Callers that bring their own HTTP stack use the first two; everyone else
//! uses the third.

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::auth::{attach_auth, AccessToken, AuthMode, Credentials};
use crate::config::ClientConfig;
use crate::decode::{expect_success, parse_json};
use crate::error::PayPalError;
use crate::http::{build_request, endpoint_url, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AgreementPayload, BillingAgreement, BillingAgreementResponse, BillingPlan,
    CreateBillingPlanResponse, PatchOperation,
};

const BILLING_PLANS: [&str; 3] = ["v1", "payments", "billing-plans"];
const BILLING_AGREEMENTS: [&str; 3] = ["v1", "payments", "billing-agreements"];

/// The PayPal operations this client wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /v1/payments/billing-plans`
    CreateBillingPlan,
    /// `PATCH /v1/payments/billing-plans/{plan_id}`
    ActivatePlan,
    /// `POST /v1/payments/billing-agreements`
    CreateBillingAgreement,
    /// `POST /v1/payments/billing-agreements/{token}/agreement-execute`
    ExecuteApprovedAgreement,
    /// `GET /v1/payments/billing-agreements/{agreement_id}`
    GetBillingAgreement,
}

impl Endpoint {
    pub fn method(&self) -> HttpMethod {
        match self {
            Endpoint::CreateBillingPlan
            | Endpoint::CreateBillingAgreement
            | Endpoint::ExecuteApprovedAgreement => HttpMethod::Post,
            Endpoint::ActivatePlan => HttpMethod::Patch,
            Endpoint::GetBillingAgreement => HttpMethod::Get,
        }
    }

    /// Activation and execution are sent with both schemes; the rest with
    /// the bearer token only.
    pub fn auth_mode(&self) -> AuthMode {
        match self {
            Endpoint::ActivatePlan | Endpoint::ExecuteApprovedAgreement => AuthMode::Both,
            Endpoint::CreateBillingPlan
            | Endpoint::CreateBillingAgreement
            | Endpoint::GetBillingAgreement => AuthMode::Bearer,
        }
    }
}

/// Client for the PayPal billing endpoints.
#[derive(Debug, Clone)]
pub struct PayPalClient<T = UreqTransport> {
    api_base: Url,
    credentials: Credentials,
    transport: T,
}

impl PayPalClient<UreqTransport> {
    /// Client that talks to PayPal over `ureq` with the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self, PayPalError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> PayPalClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, PayPalError> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            PayPalError::RequestConstruction(format!("invalid API base {:?}: {e}", config.api_base))
        })?;
        if !matches!(api_base.scheme(), "http" | "https") || api_base.cannot_be_a_base() {
            return Err(PayPalError::RequestConstruction(format!(
                "API base must be an http(s) URL, got {:?}",
                config.api_base
            )));
        }
        Ok(Self {
            api_base,
            credentials: config.credentials,
            transport,
        })
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The same client carrying a different bearer token.
    pub fn with_access_token(self, access_token: AccessToken) -> Self {
        Self {
            credentials: self.credentials.with_access_token(access_token),
            ..self
        }
    }

    fn prepare<B>(
        &self,
        endpoint: Endpoint,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<HttpRequest, PayPalError>
    where
        B: Serialize + ?Sized,
    {
        let url = endpoint_url(&self.api_base, segments)?;
        let mut request = build_request(endpoint.method(), &url, body)?;
        attach_auth(&mut request, &self.credentials, endpoint.auth_mode());
        request.validate_headers()?;
        debug!(?endpoint, auth = ?endpoint.auth_mode(), "prepared request");
        Ok(request)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, PayPalError> {
        self.transport.execute(request)
    }

    // --- create billing plan ---

    pub fn build_create_billing_plan(&self, plan: &BillingPlan) -> Result<HttpRequest, PayPalError> {
        self.prepare(Endpoint::CreateBillingPlan, &BILLING_PLANS, Some(plan))
    }

    pub fn parse_create_billing_plan(
        &self,
        response: HttpResponse,
    ) -> Result<CreateBillingPlanResponse, PayPalError> {
        parse_json(response)
    }

    /// Create a billing plan. New plans start in the `CREATED` state and must
    /// be activated before agreements can reference them.
    pub fn create_billing_plan(
        &self,
        plan: &BillingPlan,
    ) -> Result<CreateBillingPlanResponse, PayPalError> {
        let request = self.build_create_billing_plan(plan)?;
        self.parse_create_billing_plan(self.send(&request)?)
    }

    // --- activate plan ---

    /// The body is always the same JSON-Patch document; `plan_id` only
    /// appears in the path.
    pub fn build_activate_plan(&self, plan_id: &str) -> Result<HttpRequest, PayPalError> {
        let [v1, payments, plans] = BILLING_PLANS;
        self.prepare(
            Endpoint::ActivatePlan,
            &[v1, payments, plans, plan_id],
            Some(&[PatchOperation::activate()]),
        )
    }

    pub fn parse_activate_plan(&self, response: HttpResponse) -> Result<(), PayPalError> {
        expect_success(response)
    }

    pub fn activate_plan(&self, plan_id: &str) -> Result<(), PayPalError> {
        let request = self.build_activate_plan(plan_id)?;
        self.parse_activate_plan(self.send(&request)?)
    }

    // --- create billing agreement ---

    /// Only `agreement.plan.id` is sent for the plan.
    pub fn build_create_billing_agreement(
        &self,
        agreement: &BillingAgreement,
    ) -> Result<HttpRequest, PayPalError> {
        let payload = AgreementPayload::from(agreement);
        self.prepare(Endpoint::CreateBillingAgreement, &BILLING_AGREEMENTS, Some(&payload))
    }

    pub fn parse_create_billing_agreement(
        &self,
        response: HttpResponse,
    ) -> Result<BillingAgreementResponse, PayPalError> {
        parse_json(response)
    }

    /// Create an agreement for an active plan. The response's
    /// `approval_url` link is where the payer approves it.
    pub fn create_billing_agreement(
        &self,
        agreement: &BillingAgreement,
    ) -> Result<BillingAgreementResponse, PayPalError> {
        let request = self.build_create_billing_agreement(agreement)?;
        self.parse_create_billing_agreement(self.send(&request)?)
    }

    // --- execute approved agreement ---

    pub fn build_execute_approved_agreement(&self, token: &str) -> Result<HttpRequest, PayPalError> {
        let [v1, payments, agreements] = BILLING_AGREEMENTS;
        self.prepare::<()>(
            Endpoint::ExecuteApprovedAgreement,
            &[v1, payments, agreements, token, "agreement-execute"],
            None,
        )
    }

    /// A 2xx response without an agreement id means nothing was executed.
    pub fn parse_execute_approved_agreement(
        &self,
        token: &str,
        response: HttpResponse,
    ) -> Result<BillingAgreementResponse, PayPalError> {
        let agreement: BillingAgreementResponse = parse_json(response)?;
        if agreement.id.is_empty() {
            return Err(PayPalError::AgreementNotExecuted {
                token: token.to_string(),
            });
        }
        Ok(agreement)
    }

    /// Execute an agreement the payer approved, identified by the token from
    /// the approval link.
    pub fn execute_approved_agreement(
        &self,
        token: &str,
    ) -> Result<BillingAgreementResponse, PayPalError> {
        let request = self.build_execute_approved_agreement(token)?;
        self.parse_execute_approved_agreement(token, self.send(&request)?)
    }

    // --- get billing agreement ---

    pub fn build_get_billing_agreement(&self, agreement_id: &str) -> Result<HttpRequest, PayPalError> {
        let [v1, payments, agreements] = BILLING_AGREEMENTS;
        self.prepare::<()>(
            Endpoint::GetBillingAgreement,
            &[v1, payments, agreements, agreement_id],
            None,
        )
    }

    pub fn parse_get_billing_agreement(
        &self,
        response: HttpResponse,
    ) -> Result<BillingAgreementResponse, PayPalError> {
        parse_json(response)
    }

    pub fn get_billing_agreement(
        &self,
        agreement_id: &str,
    ) -> Result<BillingAgreementResponse, PayPalError> {
        let request = self.build_get_billing_agreement(agreement_id)?;
        self.parse_get_billing_agreement(self.send(&request)?)
    }
}
