//! Day-pass types
//!
//! A pass is a purchased bundle of 24-hour activation windows. At most one
//! window may be open per purchase at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique pass purchase identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassPurchaseId(pub Uuid);

impl std::fmt::Display for PassPurchaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pass bundle sizes sold at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// Single 24-hour activation
    OneDay,
    /// Bundle of three activations
    ThreeDay,
    /// Bundle of twelve activations
    TwelveDay,
}

impl PassKind {
    /// Number of activation windows in this bundle
    pub const fn activations(&self) -> i32 {
        match self {
            Self::OneDay => 1,
            Self::ThreeDay => 3,
            Self::TwelveDay => 12,
        }
    }

    /// One-time price in cents
    pub const fn price_cents(&self) -> u32 {
        match self {
            Self::OneDay => 4_99,
            Self::ThreeDay => 11_99,
            Self::TwelveDay => 39_99,
        }
    }
}

impl std::fmt::Display for PassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneDay => write!(f, "one_day"),
            Self::ThreeDay => write!(f, "three_day"),
            Self::TwelveDay => write!(f, "twelve_day"),
        }
    }
}

impl std::str::FromStr for PassKind {
    type Err = PassKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "one_day" => Ok(Self::OneDay),
            "three_day" => Ok(Self::ThreeDay),
            "twelve_day" => Ok(Self::TwelveDay),
            _ => Err(PassKindParseError(s.to_string())),
        }
    }
}

/// Error parsing a pass kind string
#[derive(Debug, Clone)]
pub struct PassKindParseError(pub String);

impl std::fmt::Display for PassKindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid pass kind: {}", self.0)
    }
}

impl std::error::Error for PassKindParseError {}

/// Summary of the currently usable pass purchase
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PassInfo {
    /// Activations left on the purchase
    pub activations_remaining: i32,
    /// Expiry of the open activation window, if one is open
    pub active_until: Option<DateTime<Utc>>,
}

/// Result of a successful day activation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActivationGrant {
    /// When the window opened
    pub activated_at: DateTime<Utc>,
    /// When the window closes
    pub expires_at: DateTime<Utc>,
    /// Activations left after this one
    pub activations_remaining: i32,
}
