//! Access errors

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Entitlement and activation errors
///
/// `NoPassAvailable` and `ActivationAlreadyActive` are domain rejections the
/// caller surfaces to the user; absence of entitlement records is never an
/// error (it resolves to the free tier).
#[derive(Error, Debug)]
pub enum AccessError {
    /// Activation requested but no purchase has remaining activations
    #[error("no pass with remaining activations")]
    NoPassAvailable,

    /// Activation requested while a window is still open
    #[error("a pass day is already active until {expires_at}")]
    ActivationAlreadyActive {
        /// When the open window closes
        expires_at: DateTime<Utc>,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(String),
}

impl AccessError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoPassAvailable => 402,
            Self::ActivationAlreadyActive { .. } => 409,
            Self::Database(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoPassAvailable => "NO_PASS_AVAILABLE",
            Self::ActivationAlreadyActive { .. } => "ACTIVATION_ALREADY_ACTIVE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<upside_db::DbError> for AccessError {
    fn from(err: upside_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::Database(err.to_string())
    }
}
