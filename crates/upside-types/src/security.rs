//! Security read model for the Auto-Mix allocator
//!
//! These values come from the external ratings/discovery pipeline and are
//! consumed read-only; the core never persists or validates them beyond
//! filtering and ranking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk classification assigned by the ratings pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBucket {
    Low,
    Balanced,
    High,
}

impl std::fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Balanced => write!(f, "balanced"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Risk filter applied before ranking candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFilter {
    /// No filtering
    Any,
    Low,
    Balanced,
    High,
}

impl RiskFilter {
    /// Whether a security in the given bucket passes this filter
    pub const fn allows(&self, risk: RiskBucket) -> bool {
        match self {
            Self::Any => true,
            Self::Low => matches!(risk, RiskBucket::Low),
            Self::Balanced => matches!(risk, RiskBucket::Balanced),
            Self::High => matches!(risk, RiskBucket::High),
        }
    }
}

impl From<RiskBucket> for RiskFilter {
    fn from(risk: RiskBucket) -> Self {
        match risk {
            RiskBucket::Low => Self::Low,
            RiskBucket::Balanced => Self::Balanced,
            RiskBucket::High => Self::High,
        }
    }
}

/// A ranked security candidate (stock or ETF pick)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    /// Ticker symbol
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Current price
    pub price: Decimal,
    /// Analyst upside to target price, in percent
    pub upside: Decimal,
    /// Risk bucket
    pub risk: RiskBucket,
}
