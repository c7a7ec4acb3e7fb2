//! Billing DTOs mirroring PayPal's JSON schema.
//!
//! # Design
//! PayPal treats an absent field and an empty one the same way, so string
//! fields are plain `String`s that default to empty on decode and are left out
//! on encode when empty. Nested records that may be absent are `Option`s.
//! Timestamps are RFC 3339 and decode into `DateTime<Utc>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A currency amount, e.g. `{"currency":"USD","value":"10.00"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency: String,
    pub value: String,
}

impl Amount {
    pub fn new(currency: &str, value: &str) -> Self {
        Self {
            currency: currency.to_string(),
            value: value.to_string(),
        }
    }
}

/// A HATEOAS link attached to most PayPal resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub rel: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub enctype: String,
}

/// Shipping or tax charge applied on top of a payment definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeModel {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub charge_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

/// One billing cycle definition of a plan (trial or regular).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDefinition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub definition_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub frequency: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub frequency_interval: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cycles: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charge_models: Vec<ChargeModel>,
}

/// Merchant-side settings: setup fee, redirect URLs, failure handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_fee: Option<Amount>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub return_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cancel_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auto_bill_amount: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub initial_fail_amount_action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub max_fail_attempts: String,
}

/// A recurring-payment template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPlan {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub plan_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_definitions: Vec<PaymentDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_preferences: Option<MerchantPreferences>,
}

/// Response of `POST /v1/payments/billing-plans`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBillingPlanResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_definitions: Vec<PaymentDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_preferences: Option<MerchantPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payer_id: String,
}

/// The paying party of an agreement. `payment_method` is usually `paypal`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    #[serde(default)]
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_info: Option<PayerInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recipient_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub line1: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub line2: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
}

/// Request record for `POST /v1/payments/billing-agreements`.
///
/// Only `plan.id` is sent for the plan; see `AgreementPayload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAgreement {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plan: BillingPlan,
    #[serde(default)]
    pub payer: Payer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_merchant_preferences: Option<MerchantPreferences>,
}

/// Running totals of an executed agreement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outstanding_balance: Option<Amount>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cycles_remaining: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cycles_completed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_billing_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub failed_payment_count: String,
}

/// Agreement as returned by create, execute and get.
///
/// After creation `id` is empty and the `approval_url` link carries the
/// token the payer approves; after execution `id` holds the agreement id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAgreementResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Payer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<BillingPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_details: Option<AgreementDetails>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl BillingAgreementResponse {
    /// The link the payer must visit to approve the agreement.
    pub fn approval_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "approval_url")
            .map(|link| link.href.as_str())
    }

    /// The `token` query parameter of the approval link, which is what
    /// `PayPalClient::execute_approved_agreement` expects.
    pub fn approval_token(&self) -> Option<String> {
        let url = Url::parse(self.approval_url()?).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
    }
}

/// Serialization view of `BillingAgreement` sent on creation.
///
/// PayPal rejects agreement requests whose plan carries anything but its id,
/// so the plan is projected down to `{"id": ...}` while the caller's record
/// stays untouched.
#[derive(Debug, Serialize)]
pub(crate) struct AgreementPayload<'a> {
    #[serde(skip_serializing_if = "str_is_empty")]
    name: &'a str,
    #[serde(skip_serializing_if = "str_is_empty")]
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<&'a DateTime<Utc>>,
    plan: PlanReference<'a>,
    payer: &'a Payer,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_address: Option<&'a ShippingAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    override_merchant_preferences: Option<&'a MerchantPreferences>,
}

#[derive(Debug, Serialize)]
struct PlanReference<'a> {
    id: &'a str,
}

impl<'a> From<&'a BillingAgreement> for AgreementPayload<'a> {
    fn from(agreement: &'a BillingAgreement) -> Self {
        Self {
            name: &agreement.name,
            description: &agreement.description,
            start_date: agreement.start_date.as_ref(),
            plan: PlanReference {
                id: &agreement.plan.id,
            },
            payer: &agreement.payer,
            shipping_address: agreement.shipping_address.as_ref(),
            override_merchant_preferences: agreement.override_merchant_preferences.as_ref(),
        }
    }
}

fn str_is_empty(s: &&str) -> bool {
    s.is_empty()
}

/// One RFC 6902 operation. Only used for plan activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PatchOperation {
    pub op: &'static str,
    pub path: &'static str,
    pub value: serde_json::Value,
}

impl PatchOperation {
    /// `{"op":"replace","path":"/","value":{"state":"ACTIVE"}}`
    pub fn activate() -> Self {
        Self {
            op: "replace",
            path: "/",
            value: serde_json::json!({ "state": "ACTIVE" }),
        }
    }
}
