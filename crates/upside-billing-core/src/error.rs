//! Billing errors

use thiserror::Error;

/// Billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// No user matches the provider customer
    #[error("user not found for customer {0}")]
    UserNotFound(String),

    /// Checkout completed for an unrecognized pass product
    #[error("unknown pass product: {0}")]
    UnknownPassProduct(String),

    /// Webhook verification or parsing error
    #[error("webhook error: {0}")]
    WebhookError(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] upside_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
