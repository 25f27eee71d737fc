//! Raw Stripe object shapes
//!
//! Minimal deserialization targets for the webhook payloads we consume.
//! Fields are read only after the payload has passed signature
//! verification, and only through these typed structs.

use serde::Deserialize;
use std::collections::HashMap;

/// Stripe subscription object (subset)
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub current_period_start: i64,
    pub current_period_end: i64,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

/// Stripe invoice object (subset)
#[derive(Debug, Clone, Deserialize)]
pub struct StripeInvoice {
    pub id: String,
    pub customer: String,
    pub status: Option<String>,
    pub subscription: Option<String>,
    #[serde(default)]
    pub amount_paid: i64,
    pub currency: String,
}

/// Stripe checkout session object (subset)
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub customer: Option<String>,
    pub mode: Option<String>,
    pub subscription: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
