//! Billing configuration

use std::collections::HashMap;

use upside_types::PassKind;

/// Billing service configuration
///
/// Maps provider price IDs to the products they sell, and carries the
/// webhook signing secret.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Stripe webhook signing secret (whsec_...)
    pub webhook_secret: String,
    /// Price ID -> pass bundle for one-time pass checkouts
    pub pass_prices: HashMap<String, PassKind>,
}

impl BillingConfig {
    /// Create a new billing config
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            pass_prices: HashMap::new(),
        }
    }

    /// Register a one-time pass price
    pub fn with_pass_price(mut self, price_id: impl Into<String>, kind: PassKind) -> Self {
        self.pass_prices.insert(price_id.into(), kind);
        self
    }

    /// Look up the pass bundle sold under a price ID
    pub fn pass_kind_for_price(&self, price_id: &str) -> Option<PassKind> {
        self.pass_prices.get(price_id).copied()
    }
}
