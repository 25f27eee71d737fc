//! Pass activation state machine
//!
//! A purchase moves between three observable states: dormant (no open
//! window), active window (latest activation not yet lapsed), and exhausted
//! (no activations remain). Lapsing is time-based; only opening a window is
//! an explicit transition, and that transition is a single atomic unit in
//! the repository.

use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use upside_db::{ActivationOutcome, PassRepository};
use upside_types::{ActivationGrant, UserId};

use crate::clock::Clock;
use crate::entitlement::select_available;
use crate::error::AccessError;

/// Length of one activation window
pub const PASS_WINDOW_HOURS: i64 = 24;

/// Opens activation windows on day passes
#[derive(Clone)]
pub struct PassActivator<P: PassRepository> {
    passes: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P: PassRepository> PassActivator<P> {
    /// Create a new activator
    pub fn new(passes: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { passes, clock }
    }

    /// Consume one activation and open a 24-hour window
    ///
    /// Selects the most recent purchase with remaining activations, then
    /// delegates the check-then-act sequence to the repository's atomic
    /// activation so two concurrent requests cannot both open a window or
    /// double-increment the counter.
    #[instrument(skip(self))]
    pub async fn activate_day(&self, user_id: &UserId) -> Result<ActivationGrant, AccessError> {
        let purchases = self.passes.find_by_user_id(user_id.0).await?;
        let Some(purchase) = select_available(&purchases) else {
            return Err(AccessError::NoPassAvailable);
        };

        let now = self.clock.now();
        let expires_at = now + Duration::hours(PASS_WINDOW_HOURS);

        match self.passes.activate(purchase.id, now, expires_at).await? {
            ActivationOutcome::Activated {
                activation,
                activations_remaining,
            } => {
                info!(
                    user_id = %user_id,
                    purchase_id = %purchase.id,
                    expires_at = %activation.expires_at,
                    activations_remaining,
                    "Pass day activated"
                );
                Ok(ActivationGrant {
                    activated_at: activation.activated_at,
                    expires_at: activation.expires_at,
                    activations_remaining,
                })
            }
            ActivationOutcome::WindowOpen { expires_at } => {
                Err(AccessError::ActivationAlreadyActive { expires_at })
            }
            // The purchase was exhausted (or deleted) between selection and
            // the locked re-check; report it as unavailable.
            ActivationOutcome::Exhausted | ActivationOutcome::NotFound => {
                warn!(user_id = %user_id, purchase_id = %purchase.id, "Lost activation race");
                Err(AccessError::NoPassAvailable)
            }
        }
    }
}

impl<P: PassRepository> std::fmt::Debug for PassActivator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassActivator").finish()
    }
}
