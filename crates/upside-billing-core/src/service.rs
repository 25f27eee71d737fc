//! Billing service
//!
//! Applies verified webhook events to the entitlement records. This is the
//! only code path that writes Subscription or PassPurchase rows.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use upside_db::{
    CreatePassPurchase, CreateSubscription, PassRepository, SubscriptionRepository, UserRepository,
    UserRow,
};
use upside_types::{PassKind, SubscriptionStatus, Tier};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::webhook::{
    CheckoutMode, CheckoutSessionData, InvoiceData, SubscriptionData, WebhookEvent,
    WebhookEventData, WebhookEventType,
};

/// Billing service
pub struct BillingService<U, S, P>
where
    U: UserRepository,
    S: SubscriptionRepository,
    P: PassRepository,
{
    users: U,
    subscriptions: S,
    passes: P,
    config: BillingConfig,
}

impl<U, S, P> BillingService<U, S, P>
where
    U: UserRepository,
    S: SubscriptionRepository,
    P: PassRepository,
{
    /// Create a new billing service
    pub fn new(users: U, subscriptions: S, passes: P, config: BillingConfig) -> Self {
        Self {
            users,
            subscriptions,
            passes,
            config,
        }
    }

    /// Apply a verified webhook event to the entitlement records
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn apply_event(&self, event: WebhookEvent) -> Result<(), BillingError> {
        match event.data {
            WebhookEventData::CheckoutSession(session) => self.apply_checkout(session).await,
            WebhookEventData::Subscription(sub) => {
                self.apply_subscription(&event.event_type, sub).await
            }
            WebhookEventData::Invoice(invoice) => self.apply_invoice(invoice).await,
            WebhookEventData::Raw(_) => {
                info!(event_type = ?event.event_type, "Ignoring unhandled event");
                Ok(())
            }
        }
    }

    /// Checkout completed: pass purchases arrive as one-time payments
    async fn apply_checkout(&self, session: CheckoutSessionData) -> Result<(), BillingError> {
        let user = self.resolve_user(&session.customer_id, &session.metadata).await?;

        match session.mode {
            CheckoutMode::Payment => {
                let kind = self.pass_kind_from_metadata(&session.metadata)?;
                let purchase = self
                    .passes
                    .create(CreatePassPurchase {
                        id: Uuid::new_v4(),
                        user_id: user.id,
                        kind: kind.to_string(),
                        activations_total: kind.activations(),
                    })
                    .await?;
                info!(
                    user_id = %user.id,
                    purchase_id = %purchase.id,
                    kind = %kind,
                    "Pass purchase recorded"
                );
                Ok(())
            }
            // Subscription checkouts only link the customer here; the
            // customer.subscription.created event carries the details.
            CheckoutMode::Subscription | CheckoutMode::Other => Ok(()),
        }
    }

    /// Subscription created/updated/deleted
    ///
    /// The row carries tier PLUS while the provider reports the subscription
    /// alive; a delete event downgrades the stored tier to FREE.
    async fn apply_subscription(
        &self,
        event_type: &WebhookEventType,
        data: SubscriptionData,
    ) -> Result<(), BillingError> {
        let status = map_provider_status(&data.status);
        let deleted = *event_type == WebhookEventType::CustomerSubscriptionDeleted;
        let tier = if deleted { Tier::Free } else { Tier::Plus };

        match self.subscriptions.find_by_stripe_id(&data.subscription_id).await? {
            Some(existing) => {
                self.subscriptions
                    .update_status(existing.id, &status.to_string())
                    .await?;
                if deleted {
                    self.subscriptions
                        .update_tier(existing.id, &tier.to_string())
                        .await?;
                }
                self.subscriptions
                    .update_period(existing.id, data.period_start, data.period_end)
                    .await?;
                self.subscriptions
                    .set_cancel_at_period_end(existing.id, data.cancel_at_period_end)
                    .await?;
                info!(
                    subscription_id = %existing.id,
                    %status,
                    "Subscription updated from provider event"
                );
            }
            None => {
                let user = self
                    .users
                    .find_by_stripe_customer_id(&data.customer_id)
                    .await?
                    .ok_or_else(|| BillingError::UserNotFound(data.customer_id.clone()))?;

                let created = self
                    .subscriptions
                    .create(CreateSubscription {
                        id: Uuid::new_v4(),
                        user_id: user.id,
                        tier: tier.to_string(),
                        status: status.to_string(),
                        stripe_customer_id: Some(data.customer_id),
                        stripe_subscription_id: Some(data.subscription_id),
                        current_period_start: Some(data.period_start),
                        current_period_end: Some(data.period_end),
                    })
                    .await?;
                info!(subscription_id = %created.id, %status, "Subscription created");
            }
        }

        Ok(())
    }

    /// Invoice paid / payment failed
    async fn apply_invoice(&self, invoice: InvoiceData) -> Result<(), BillingError> {
        // One-time invoices (passes) carry no subscription and need no
        // status bookkeeping here.
        let Some(subscription_id) = invoice.subscription_id else {
            return Ok(());
        };

        let Some(sub) = self.subscriptions.find_by_stripe_id(&subscription_id).await? else {
            warn!(%subscription_id, "Invoice for unknown subscription");
            return Ok(());
        };

        let status = if invoice.status == "paid" {
            SubscriptionStatus::Active
        } else {
            SubscriptionStatus::PastDue
        };
        self.subscriptions
            .update_status(sub.id, &status.to_string())
            .await?;
        info!(subscription_id = %sub.id, %status, invoice_id = %invoice.invoice_id, "Invoice applied");

        Ok(())
    }

    /// Resolve the owning user for a checkout session
    ///
    /// Sessions created by the app carry the user ID in metadata; fall back
    /// to the provider customer link. A metadata match also backfills the
    /// customer ID on first purchase.
    async fn resolve_user(
        &self,
        customer_id: &str,
        metadata: &std::collections::HashMap<String, String>,
    ) -> Result<UserRow, BillingError> {
        if let Some(user_id) = metadata.get("user_id").and_then(|v| Uuid::parse_str(v).ok()) {
            if let Some(user) = self.users.find_by_id(user_id).await? {
                if !customer_id.is_empty()
                    && user.stripe_customer_id.as_deref() != Some(customer_id)
                {
                    self.users
                        .update_stripe_customer_id(user.id, customer_id)
                        .await?;
                }
                return Ok(user);
            }
        }

        self.users
            .find_by_stripe_customer_id(customer_id)
            .await?
            .ok_or_else(|| BillingError::UserNotFound(customer_id.to_string()))
    }

    /// Pass bundle for a checkout session's metadata
    fn pass_kind_from_metadata(
        &self,
        metadata: &std::collections::HashMap<String, String>,
    ) -> Result<PassKind, BillingError> {
        if let Some(kind) = metadata.get("pass_kind").and_then(|v| v.parse().ok()) {
            return Ok(kind);
        }
        if let Some(price_id) = metadata.get("price_id") {
            if let Some(kind) = self.config.pass_kind_for_price(price_id) {
                return Ok(kind);
            }
            return Err(BillingError::UnknownPassProduct(price_id.clone()));
        }
        Err(BillingError::UnknownPassProduct("<missing metadata>".to_string()))
    }
}

/// Map a provider status string onto our subscription status
fn map_provider_status(status: &str) -> SubscriptionStatus {
    match status {
        "active" => SubscriptionStatus::Active,
        "trialing" => SubscriptionStatus::Trialing,
        "past_due" => SubscriptionStatus::PastDue,
        "canceled" | "unpaid" | "incomplete_expired" => SubscriptionStatus::Canceled,
        _ => SubscriptionStatus::Inactive,
    }
}

impl<U, S, P> std::fmt::Debug for BillingService<U, S, P>
where
    U: UserRepository,
    S: SubscriptionRepository,
    P: PassRepository,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService").finish()
    }
}
