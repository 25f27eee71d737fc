//! Upside Billing Core - Billing business logic
//!
//! Entitlement records (subscriptions and pass purchases) change only in
//! response to verified payment-provider webhook events. This crate
//! verifies and parses those events into a closed variant type and applies
//! them to the data layer. It never calls the payment provider itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use upside_billing_core::{BillingConfig, BillingService, WebhookHandler};
//!
//! let config = BillingConfig::new("whsec_...")
//!     .with_pass_price("price_pass_three", PassKind::ThreeDay);
//!
//! let handler = WebhookHandler::new(config.webhook_secret.clone());
//! let event = handler.verify_and_parse(payload, signature)?;
//! billing.apply_event(event).await?;
//! ```

pub mod config;
pub mod error;
pub mod service;
pub mod stripe;
pub mod webhook;

pub use config::BillingConfig;
pub use error::BillingError;
pub use service::BillingService;
pub use webhook::{
    CheckoutMode, WebhookEvent, WebhookEventData, WebhookEventType, WebhookHandler,
};
