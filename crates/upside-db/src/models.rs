//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! Enum-ish columns (tier, status, pass kind) are stored as text and parsed
//! into domain enums at the edge.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use upside_types::{PassKind, SubscriptionStatus, Tier};

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription row from the database
///
/// At most one row per user; rows are never hard-deleted.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: String,
    pub status: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pass purchase row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PassPurchaseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub activations_total: i32,
    pub activations_used: i32,
    pub purchased_at: DateTime<Utc>,
}

/// Pass activation row from the database
///
/// Immutable once created; a window "expires" by comparison against now,
/// never by an update.
#[derive(Debug, Clone, FromRow)]
pub struct PassActivationRow {
    pub id: Uuid,
    pub pass_purchase_id: Uuid,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> upside_types::UserId {
        upside_types::UserId(self.id)
    }
}

impl SubscriptionRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> upside_types::UserId {
        upside_types::UserId(self.user_id)
    }

    /// Parse the stored status, falling back to inactive on unknown values
    pub fn status(&self) -> SubscriptionStatus {
        self.status.parse().unwrap_or(SubscriptionStatus::Inactive)
    }

    /// Parse the stored tier, falling back to free on unknown values
    pub fn tier(&self) -> Tier {
        self.tier.parse().unwrap_or(Tier::Free)
    }
}

impl PassPurchaseRow {
    /// Convert to domain PassPurchaseId
    pub fn purchase_id(&self) -> upside_types::PassPurchaseId {
        upside_types::PassPurchaseId(self.id)
    }

    /// Parse the stored kind, if recognized
    pub fn kind(&self) -> Option<PassKind> {
        self.kind.parse().ok()
    }

    /// Activations left on this purchase
    pub fn activations_remaining(&self) -> i32 {
        self.activations_total - self.activations_used
    }

    /// Whether any activations remain
    pub fn has_remaining(&self) -> bool {
        self.activations_used < self.activations_total
    }
}

impl PassActivationRow {
    /// Whether the window is still open at the given instant
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
