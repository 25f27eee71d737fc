//! Access service - ties entitlement resolution and pass activation together

use std::sync::Arc;
use std::time::Duration;

use upside_db::{PassRepository, SubscriptionRepository};
use upside_types::{ActivationGrant, Feature, FeatureCheck, PassInfo, Tier, UserId};

use crate::{
    activation::PassActivator,
    clock::{Clock, SystemClock},
    entitlement::EntitlementResolver,
    AccessError,
};

/// Access service
///
/// Provides the unified entitlement interface:
/// - Tier resolution (subscription wins over pass)
/// - Day-pass lifecycle (activation, window queries)
/// - Feature gating by tier
pub struct AccessService<S: SubscriptionRepository, P: PassRepository> {
    resolver: EntitlementResolver<S, P>,
    activator: PassActivator<P>,
}

impl<S: SubscriptionRepository, P: PassRepository> AccessService<S, P> {
    /// Create a new access service with the system clock
    pub fn new(subscriptions: Arc<S>, passes: Arc<P>) -> Self {
        Self::with_clock(subscriptions, passes, Arc::new(SystemClock))
    }

    /// Create with an injected clock (used by tests to step across windows)
    pub fn with_clock(subscriptions: Arc<S>, passes: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            resolver: EntitlementResolver::new(subscriptions, Arc::clone(&passes), Arc::clone(&clock)),
            activator: PassActivator::new(passes, clock),
        }
    }

    /// Create with an injected clock and a custom tier cache duration
    pub fn with_clock_and_cache(
        subscriptions: Arc<S>,
        passes: Arc<P>,
        clock: Arc<dyn Clock>,
        cache_duration: Duration,
    ) -> Self {
        Self {
            resolver: EntitlementResolver::with_cache_duration(
                subscriptions,
                Arc::clone(&passes),
                Arc::clone(&clock),
                cache_duration,
            ),
            activator: PassActivator::new(passes, clock),
        }
    }

    /// Get the user's effective tier
    pub async fn resolve_tier(&self, user_id: &UserId) -> Result<Tier, AccessError> {
        self.resolver.resolve_tier(user_id).await
    }

    /// Pass summary for the currently usable purchase
    pub async fn pass_info(&self, user_id: &UserId) -> Result<Option<PassInfo>, AccessError> {
        self.resolver.pass_info(user_id).await
    }

    /// Whether an activation window is open right now
    pub async fn is_pass_active(&self, user_id: &UserId) -> Result<bool, AccessError> {
        self.resolver.is_pass_active(user_id).await
    }

    /// Whether any purchase still has activations left
    pub async fn can_activate_pass(&self, user_id: &UserId) -> Result<bool, AccessError> {
        self.resolver.can_activate_pass(user_id).await
    }

    /// Consume one activation and open a 24-hour window
    ///
    /// Drops the cached tier on success, so consuming the final activation
    /// is reflected by the next `resolve_tier` call.
    pub async fn activate_pass_day(&self, user_id: &UserId) -> Result<ActivationGrant, AccessError> {
        let grant = self.activator.activate_day(user_id).await?;
        self.resolver.invalidate_tier(user_id).await;
        Ok(grant)
    }

    /// Check feature access by tier
    pub async fn check_feature(
        &self,
        user_id: &UserId,
        feature: Feature,
    ) -> Result<FeatureCheck, AccessError> {
        self.resolver.check_feature(user_id, feature).await
    }

    /// Invalidate cached tier for a user (call after purchases or webhook writes)
    pub async fn invalidate_tier(&self, user_id: &UserId) {
        self.resolver.invalidate_tier(user_id).await;
    }
}

impl<S: SubscriptionRepository, P: PassRepository> std::fmt::Debug for AccessService<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessService").finish()
    }
}
