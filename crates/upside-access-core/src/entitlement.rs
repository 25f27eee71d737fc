//! Entitlement resolution
//!
//! Derives the effective tier from subscription and pass state. Subscription
//! entitlement always wins over pass entitlement. A pass holder is tier
//! `pass` whether or not a window is currently open; `is_pass_active`
//! answers the window question separately.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use upside_db::{PassPurchaseRow, PassRepository, SubscriptionRepository};
use upside_types::{Feature, FeatureCheck, PassInfo, Tier, UserId};

use crate::clock::Clock;
use crate::error::AccessError;

/// Entitlement resolver with tier caching
#[derive(Clone)]
pub struct EntitlementResolver<S: SubscriptionRepository, P: PassRepository> {
    subscriptions: Arc<S>,
    passes: Arc<P>,
    clock: Arc<dyn Clock>,
    /// Cache of user_id -> tier
    tier_cache: Cache<Uuid, Tier>,
}

impl<S: SubscriptionRepository, P: PassRepository> EntitlementResolver<S, P> {
    /// Create a new resolver with the default cache duration
    pub fn new(subscriptions: Arc<S>, passes: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self::with_cache_duration(subscriptions, passes, clock, Duration::from_secs(60))
    }

    /// Create with a custom tier cache duration
    pub fn with_cache_duration(
        subscriptions: Arc<S>,
        passes: Arc<P>,
        clock: Arc<dyn Clock>,
        cache_duration: Duration,
    ) -> Self {
        Self {
            subscriptions,
            passes,
            clock,
            tier_cache: Cache::builder()
                .time_to_live(cache_duration)
                .max_capacity(10_000)
                .build(),
        }
    }

    /// Get the user's effective tier
    ///
    /// Absence of any subscription or pass record is a normal `Free` result,
    /// never an error.
    pub async fn resolve_tier(&self, user_id: &UserId) -> Result<Tier, AccessError> {
        if let Some(tier) = self.tier_cache.get(&user_id.0).await {
            return Ok(tier);
        }

        let tier = self.resolve_tier_uncached(user_id).await?;
        self.tier_cache.insert(user_id.0, tier).await;

        Ok(tier)
    }

    async fn resolve_tier_uncached(&self, user_id: &UserId) -> Result<Tier, AccessError> {
        // Subscription entitlement first; it wins on tie.
        if let Some(sub) = self.subscriptions.find_by_user_id(user_id.0).await? {
            if sub.status().grants_access() && sub.tier() == Tier::Plus {
                return Ok(Tier::Plus);
            }
        }

        let purchases = self.passes.find_by_user_id(user_id.0).await?;
        if select_available(&purchases).is_some() {
            return Ok(Tier::Pass);
        }

        Ok(Tier::Free)
    }

    /// Pass summary for the currently usable purchase, if any
    ///
    /// `active_until` is set only while a window is still open. A purchase
    /// whose final activation opened the current window counts here even
    /// though nothing remains to activate, so a paid day is never reported
    /// as inactive before it lapses.
    pub async fn pass_info(&self, user_id: &UserId) -> Result<Option<PassInfo>, AccessError> {
        let purchases = self.passes.find_by_user_id(user_id.0).await?;
        let now = self.clock.now();

        let mut active_until: Option<chrono::DateTime<chrono::Utc>> = None;
        for purchase in &purchases {
            let open = self
                .passes
                .latest_activation(purchase.id)
                .await?
                .filter(|a| a.is_open_at(now))
                .map(|a| a.expires_at);
            if let Some(expires_at) = open {
                if active_until.map_or(true, |current| expires_at > current) {
                    active_until = Some(expires_at);
                }
            }
        }

        let activations_remaining =
            select_available(&purchases).map_or(0, |p| p.activations_remaining());

        if activations_remaining == 0 && active_until.is_none() {
            return Ok(None);
        }

        Ok(Some(PassInfo {
            activations_remaining,
            active_until,
        }))
    }

    /// Whether an activation window is open right now
    pub async fn is_pass_active(&self, user_id: &UserId) -> Result<bool, AccessError> {
        Ok(self
            .pass_info(user_id)
            .await?
            .is_some_and(|info| info.active_until.is_some()))
    }

    /// Whether any purchase still has activations left
    pub async fn can_activate_pass(&self, user_id: &UserId) -> Result<bool, AccessError> {
        let purchases = self.passes.find_by_user_id(user_id.0).await?;
        Ok(select_available(&purchases).is_some())
    }

    /// Check feature access by tier
    ///
    /// Pass holders count as paid here regardless of window state; callers
    /// that need an open window combine this with `is_pass_active`.
    pub async fn check_feature(
        &self,
        user_id: &UserId,
        feature: Feature,
    ) -> Result<FeatureCheck, AccessError> {
        let tier = self.resolve_tier(user_id).await?;
        let min_tier = feature.min_tier();

        if tier.level() >= min_tier.level() {
            Ok(FeatureCheck {
                allowed: true,
                reason: None,
            })
        } else {
            debug!(user_id = %user_id, feature = %feature, %tier, "Feature denied");
            Ok(FeatureCheck {
                allowed: false,
                reason: Some(format!("Feature '{feature}' requires {min_tier} tier or higher")),
            })
        }
    }

    /// Invalidate cached tier for a user (call after purchases or webhook writes)
    pub async fn invalidate_tier(&self, user_id: &UserId) {
        self.tier_cache.invalidate(&user_id.0).await;
    }
}

/// Pick the purchase to draw activations from: most recent first with
/// activations remaining. Rows must already be ordered most recent first.
pub(crate) fn select_available(purchases: &[PassPurchaseRow]) -> Option<&PassPurchaseRow> {
    purchases.iter().find(|p| p.has_remaining())
}

impl<S: SubscriptionRepository, P: PassRepository> std::fmt::Debug for EntitlementResolver<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementResolver").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn purchase(used: i32, total: i32, age_hours: i64) -> PassPurchaseRow {
        PassPurchaseRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "three_day".to_string(),
            activations_total: total,
            activations_used: used,
            purchased_at: Utc::now() - chrono::Duration::hours(age_hours),
        }
    }

    #[test]
    fn test_select_skips_exhausted() {
        let newest = purchase(3, 3, 0);
        let older = purchase(1, 3, 5);
        let purchases = vec![newest, older.clone()];

        let selected = select_available(&purchases).unwrap();
        assert_eq!(selected.id, older.id);
    }

    #[test]
    fn test_select_prefers_most_recent() {
        let newest = purchase(0, 1, 0);
        let older = purchase(0, 12, 5);
        let purchases = vec![newest.clone(), older];

        let selected = select_available(&purchases).unwrap();
        assert_eq!(selected.id, newest.id);
    }

    #[test]
    fn test_select_none_when_all_exhausted() {
        let purchases = vec![purchase(1, 1, 0), purchase(3, 3, 2)];
        assert!(select_available(&purchases).is_none());
    }
}
