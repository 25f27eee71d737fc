//! Mock repositories and clock for testing

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use upside_access_core::Clock;
use upside_db::{
    ActivationOutcome, CreatePassPurchase, CreateSubscription, DbResult, PassActivationRow,
    PassPurchaseRow, PassRepository, SubscriptionRepository, SubscriptionRow,
};

/// Manually stepped clock
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        ManualClock::now(self)
    }
}

/// In-memory subscription repository (one row per user)
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    by_user: Arc<DashMap<Uuid, SubscriptionRow>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subscription row directly
    pub fn insert(&self, row: SubscriptionRow) {
        self.by_user.insert(row.user_id, row);
    }

    /// Build a subscription row for a user with the given tier and status
    pub fn subscription(user_id: Uuid, tier: &str, status: &str) -> SubscriptionRow {
        let now = Utc::now();
        SubscriptionRow {
            id: Uuid::new_v4(),
            user_id,
            tier: tier.to_string(),
            status: status.to_string(),
            stripe_customer_id: Some(format!("cus_{user_id}")),
            stripe_subscription_id: Some(format!("sub_{user_id}")),
            current_period_start: Some(now),
            current_period_end: Some(now + Duration::days(30)),
            cancel_at_period_end: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.by_user.get(&user_id).map(|r| r.value().clone()))
    }

    async fn find_by_stripe_id(&self, stripe_id: &str) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .by_user
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
        self.insert(row.clone());
        Ok(row)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> DbResult<()> {
        for mut row in self.by_user.iter_mut() {
            if row.id == id {
                row.status = status.to_string();
                row.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn update_tier(&self, id: Uuid, tier: &str) -> DbResult<()> {
        for mut row in self.by_user.iter_mut() {
            if row.id == id {
                row.tier = tier.to_string();
                row.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn update_period(
        &self,
        id: Uuid,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> DbResult<()> {
        for mut row in self.by_user.iter_mut() {
            if row.id == id {
                row.current_period_start = Some(period_start);
                row.current_period_end = Some(period_end);
                row.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn set_cancel_at_period_end(&self, id: Uuid, cancel: bool) -> DbResult<()> {
        for mut row in self.by_user.iter_mut() {
            if row.id == id {
                row.cancel_at_period_end = cancel;
                row.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

/// In-memory pass repository
///
/// `activate` holds a lock for the whole check-then-act sequence, mirroring
/// the row lock the Postgres implementation takes.
#[derive(Default, Clone)]
pub struct MockPassRepository {
    purchases: Arc<DashMap<Uuid, PassPurchaseRow>>,
    activations: Arc<DashMap<Uuid, Vec<PassActivationRow>>>,
    activate_lock: Arc<Mutex<()>>,
}

impl MockPassRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a purchase row directly
    pub fn insert_purchase(&self, row: PassPurchaseRow) {
        self.purchases.insert(row.id, row);
    }

    /// Build a purchase row
    pub fn purchase(
        user_id: Uuid,
        kind: &str,
        total: i32,
        used: i32,
        purchased_at: DateTime<Utc>,
    ) -> PassPurchaseRow {
        PassPurchaseRow {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.to_string(),
            activations_total: total,
            activations_used: used,
            purchased_at,
        }
    }

    /// Number of activation rows across all purchases of a user
    pub fn activation_count(&self, user_id: Uuid) -> usize {
        self.purchases
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| self.activations.get(&p.id).map_or(0, |a| a.len()))
            .sum()
    }

    /// Current `activations_used` on a purchase
    pub fn used(&self, purchase_id: Uuid) -> i32 {
        self.purchases
            .get(&purchase_id)
            .map(|p| p.activations_used)
            .unwrap_or(0)
    }
}

#[async_trait]
impl PassRepository for MockPassRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<PassPurchaseRow>> {
        let mut rows: Vec<PassPurchaseRow> = self
            .purchases
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(rows)
    }

    async fn latest_activation(&self, purchase_id: Uuid) -> DbResult<Option<PassActivationRow>> {
        Ok(self
            .activations
            .get(&purchase_id)
            .and_then(|list| list.iter().max_by_key(|a| a.activated_at).cloned()))
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
        self.insert_purchase(row.clone());
        Ok(row)
    }

    async fn activate(
        &self,
        purchase_id: Uuid,
        activated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DbResult<ActivationOutcome> {
        let _guard = self.activate_lock.lock().unwrap();

        let Some(mut purchase) = self.purchases.get_mut(&purchase_id) else {
            return Ok(ActivationOutcome::NotFound);
        };

        if purchase.activations_used >= purchase.activations_total {
            return Ok(ActivationOutcome::Exhausted);
        }

        let latest = self
            .activations
            .get(&purchase_id)
            .and_then(|list| list.iter().max_by_key(|a| a.activated_at).cloned());
        if let Some(open) = latest {
            if open.expires_at > activated_at {
                return Ok(ActivationOutcome::WindowOpen {
                    expires_at: open.expires_at,
                });
            }
        }

        let activation = PassActivationRow {
            id: Uuid::new_v4(),
            pass_purchase_id: purchase_id,
            activated_at,
            expires_at,
        };
        self.activations
            .entry(purchase_id)
            .or_default()
            .push(activation.clone());
        purchase.activations_used += 1;

        Ok(ActivationOutcome::Activated {
            activation,
            activations_remaining: purchase.activations_total - purchase.activations_used,
        })
    }
}
