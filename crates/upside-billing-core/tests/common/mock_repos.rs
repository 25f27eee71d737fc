//! In-memory repositories for billing tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use upside_db::{
    ActivationOutcome, CreatePassPurchase, CreateSubscription, DbResult, PassActivationRow,
    PassPurchaseRow, PassRepository, SubscriptionRepository, SubscriptionRow, UserRepository,
    UserRow,
};

/// In-memory user repository
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test user with an optional Stripe customer link
    pub fn insert_user(&self, id: Uuid, customer_id: Option<&str>) -> UserRow {
        let now = Utc::now();
        let row = UserRow {
            id,
            email: format!("user-{id}@example.com"),
            stripe_customer_id: customer_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: Uuid) -> Option<UserRow> {
        self.users.get(&id).map(|r| r.value().clone())
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_stripe_customer_id(&self, customer_id: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .users
            .iter()
            .find(|r| r.stripe_customer_id.as_deref() == Some(customer_id))
            .map(|r| r.value().clone()))
    }

    async fn update_stripe_customer_id(&self, id: Uuid, customer_id: &str) -> DbResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.stripe_customer_id = Some(customer_id.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// In-memory subscription repository
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subs: Arc<DashMap<Uuid, SubscriptionRow>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(&self, user_id: Uuid) -> Option<SubscriptionRow> {
        self.subs
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.for_user(user_id))
    }

    async fn find_by_stripe_id(&self, stripe_id: &str) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .subs
            .iter()
            .find(|r| r.stripe_subscription_id.as_deref() == Some(stripe_id))
            .map(|r| r.value().clone()))
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let now = Utc::now();
        let row = SubscriptionRow {
            id: sub.id,
            user_id: sub.user_id,
            tier: sub.tier,
            status: sub.status,
            stripe_customer_id: sub.stripe_customer_id,
            stripe_subscription_id: sub.stripe_subscription_id,
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
            cancel_at_period_end: false,
            created_at: now,
            updated_at: now,
        };
        self.subs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> DbResult<()> {
        if let Some(mut row) = self.subs.get_mut(&id) {
            row.status = status.to_string();
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_tier(&self, id: Uuid, tier: &str) -> DbResult<()> {
        if let Some(mut row) = self.subs.get_mut(&id) {
            row.tier = tier.to_string();
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_period(
        &self,
        id: Uuid,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> DbResult<()> {
        if let Some(mut row) = self.subs.get_mut(&id) {
            row.current_period_start = Some(period_start);
            row.current_period_end = Some(period_end);
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_cancel_at_period_end(&self, id: Uuid, cancel: bool) -> DbResult<()> {
        if let Some(mut row) = self.subs.get_mut(&id) {
            row.cancel_at_period_end = cancel;
            row.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// In-memory pass repository (purchase side only; billing never activates)
#[derive(Default, Clone)]
pub struct MockPassRepository {
    purchases: Arc<DashMap<Uuid, PassPurchaseRow>>,
}

impl MockPassRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(&self, user_id: Uuid) -> Vec<PassPurchaseRow> {
        self.purchases
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect()
    }
}

#[async_trait]
impl PassRepository for MockPassRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<PassPurchaseRow>> {
        let mut rows = self.for_user(user_id);
        rows.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(rows)
    }

    async fn latest_activation(&self, _purchase_id: Uuid) -> DbResult<Option<PassActivationRow>> {
        Ok(None)
    }

    async fn create(&self, purchase: CreatePassPurchase) -> DbResult<PassPurchaseRow> {
        let row = PassPurchaseRow {
            id: purchase.id,
            user_id: purchase.user_id,
            kind: purchase.kind,
            activations_total: purchase.activations_total,
            activations_used: 0,
            purchased_at: Utc::now(),
        };
        self.purchases.insert(row.id, row.clone());
        Ok(row)
    }

    async fn activate(
        &self,
        _purchase_id: Uuid,
        _activated_at: DateTime<Utc>,
        _expires_at: DateTime<Utc>,
    ) -> DbResult<ActivationOutcome> {
        Ok(ActivationOutcome::NotFound)
    }
}
