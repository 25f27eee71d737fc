//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by Stripe customer ID
    async fn find_by_stripe_customer_id(&self, customer_id: &str) -> DbResult<Option<UserRow>>;

    /// Update a user's Stripe customer ID
    async fn update_stripe_customer_id(&self, id: Uuid, customer_id: &str) -> DbResult<()>;
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find the subscription for a user (at most one exists)
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<SubscriptionRow>>;

    /// Find a subscription by Stripe subscription ID
    async fn find_by_stripe_id(&self, stripe_id: &str) -> DbResult<Option<SubscriptionRow>>;

    /// Create a new subscription
    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow>;

    /// Update subscription status
    async fn update_status(&self, id: Uuid, status: &str) -> DbResult<()>;

    /// Update subscription tier
    async fn update_tier(&self, id: Uuid, tier: &str) -> DbResult<()>;

    /// Update subscription period
    async fn update_period(
        &self,
        id: Uuid,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> DbResult<()>;

    /// Mark subscription for cancellation at period end
    async fn set_cancel_at_period_end(&self, id: Uuid, cancel: bool) -> DbResult<()>;
}

/// Create subscription input
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: String,
    pub status: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
}

/// Outcome of the atomic pass activation transaction
///
/// The insert-activation + increment-counter pair either fully applies
/// (`Activated`) or not at all; the other variants report why the purchase
/// could not be activated, re-checked under the row lock.
#[derive(Debug, Clone)]
pub enum ActivationOutcome {
    /// A new window was opened
    Activated {
        activation: PassActivationRow,
        activations_remaining: i32,
    },
    /// A window is already open on this purchase
    WindowOpen { expires_at: DateTime<Utc> },
    /// No activations remain on this purchase
    Exhausted,
    /// The purchase row does not exist
    NotFound,
}

/// Pass repository trait
#[async_trait]
pub trait PassRepository: Send + Sync {
    /// All pass purchases for a user, most recent first
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<PassPurchaseRow>>;

    /// Most recent activation for a purchase
    async fn latest_activation(&self, purchase_id: Uuid) -> DbResult<Option<PassActivationRow>>;

    /// Create a new pass purchase
    async fn create(&self, purchase: CreatePassPurchase) -> DbResult<PassPurchaseRow>;

    /// Open a new activation window on a purchase
    ///
    /// Must serialize the read-check-write sequence per purchase: re-check
    /// remaining activations and the latest window under a row lock, then
    /// insert the activation and increment `activations_used` in the same
    /// transaction.
    async fn activate(
        &self,
        purchase_id: Uuid,
        activated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DbResult<ActivationOutcome>;
}

/// Create pass purchase input
#[derive(Debug, Clone)]
pub struct CreatePassPurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub activations_total: i32,
}
