//! PostgreSQL pass repository implementation
//!
//! The activation transaction is the one correctness-critical write path in
//! the system: it locks the purchase row, re-checks the overlap and
//! remaining-activation invariants, and applies the insert + increment pair
//! atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{PassActivationRow, PassPurchaseRow};
use crate::repo::{ActivationOutcome, CreatePassPurchase, PassRepository};

/// PostgreSQL pass repository
#[derive(Clone)]
pub struct PgPassRepository {
    pool: PgPool,
}

impl PgPassRepository {
    /// Create a new pass repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PassRepository for PgPassRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<PassPurchaseRow>> {
        let purchases = sqlx::query_as::<_, PassPurchaseRow>(
            r#"
            SELECT id, user_id, kind, activations_total, activations_used, purchased_at
            FROM pass_purchases
            WHERE user_id = $1
            ORDER BY purchased_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    async fn latest_activation(&self, purchase_id: Uuid) -> DbResult<Option<PassActivationRow>> {
        let activation = sqlx::query_as::<_, PassActivationRow>(
            r#"
            SELECT id, pass_purchase_id, activated_at, expires_at
            FROM pass_activations
            WHERE pass_purchase_id = $1
            ORDER BY activated_at DESC
            LIMIT 1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(activation)
    }

    async fn create(&self, purchase: CreatePassPurchase) -> DbResult<PassPurchaseRow> {
        let row = sqlx::query_as::<_, PassPurchaseRow>(
            r#"
            INSERT INTO pass_purchases (id, user_id, kind, activations_total)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, kind, activations_total, activations_used, purchased_at
            "#,
        )
        .bind(purchase.id)
        .bind(purchase.user_id)
        .bind(&purchase.kind)
        .bind(purchase.activations_total)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn activate(
        &self,
        purchase_id: Uuid,
        activated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DbResult<ActivationOutcome> {
        let mut tx = self.pool.begin().await?;

        // Lock the purchase row; concurrent activations for the same
        // purchase queue up here.
        let purchase = sqlx::query_as::<_, PassPurchaseRow>(
            r#"
            SELECT id, user_id, kind, activations_total, activations_used, purchased_at
            FROM pass_purchases
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(purchase) = purchase else {
            tx.rollback().await?;
            return Ok(ActivationOutcome::NotFound);
        };

        if purchase.activations_used >= purchase.activations_total {
            tx.rollback().await?;
            return Ok(ActivationOutcome::Exhausted);
        }

        let latest = sqlx::query_as::<_, PassActivationRow>(
            r#"
            SELECT id, pass_purchase_id, activated_at, expires_at
            FROM pass_activations
            WHERE pass_purchase_id = $1
            ORDER BY activated_at DESC
            LIMIT 1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(open) = latest {
            if open.expires_at > activated_at {
                tx.rollback().await?;
                return Ok(ActivationOutcome::WindowOpen {
                    expires_at: open.expires_at,
                });
            }
        }

        let activation = sqlx::query_as::<_, PassActivationRow>(
            r#"
            INSERT INTO pass_activations (id, pass_purchase_id, activated_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, pass_purchase_id, activated_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(purchase_id)
        .bind(activated_at)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE pass_purchases SET activations_used = activations_used + 1 WHERE id = $1")
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(purchase_id = %purchase_id, expires_at = %expires_at, "Opened pass activation window");

        Ok(ActivationOutcome::Activated {
            activation,
            activations_remaining: purchase.activations_total - purchase.activations_used - 1,
        })
    }
}
