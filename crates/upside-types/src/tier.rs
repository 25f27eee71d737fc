//! Access tier types and feature gating

use serde::{Deserialize, Serialize};

/// Effective access level for a user
///
/// Derived from subscription and day-pass state; never stored directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// No paid entitlement
    Free,
    /// Holds a day pass with remaining activations (window may or may not be open)
    Pass,
    /// Active PLUS subscription
    Plus,
}

impl Tier {
    /// Whether this tier unlocks paid content
    pub const fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Numeric level for ordering comparisons
    pub const fn level(&self) -> u8 {
        match self {
            Self::Free => 0,
            Self::Pass => 1,
            Self::Plus => 2,
        }
    }

    /// Features available for this tier
    pub const fn features(&self) -> &'static [&'static str] {
        match self {
            Self::Free => &["ratings_summary", "broker_compare"],
            Self::Pass | Self::Plus => &[
                "ratings_summary",
                "broker_compare",
                "full_ratings",
                "top_picks",
                "etf_picks",
                "auto_mix",
            ],
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Pass => write!(f, "pass"),
            Self::Plus => write!(f, "plus"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pass" => Ok(Self::Pass),
            "plus" => Ok(Self::Plus),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

/// Error parsing a tier string
#[derive(Debug, Clone)]
pub struct TierParseError(pub String);

impl std::fmt::Display for TierParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid tier: {}", self.0)
    }
}

impl std::error::Error for TierParseError {}

/// Known gated features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Consensus rating summary (free teaser)
    RatingsSummary,
    /// Broker referral comparison table
    BrokerCompare,
    /// Full analyst rating detail
    FullRatings,
    /// Ranked top stock picks
    TopPicks,
    /// Ranked ETF picks
    EtfPicks,
    /// Auto-Mix portfolio builder
    AutoMix,
}

impl Feature {
    /// Get the feature ID string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RatingsSummary => "ratings_summary",
            Self::BrokerCompare => "broker_compare",
            Self::FullRatings => "full_ratings",
            Self::TopPicks => "top_picks",
            Self::EtfPicks => "etf_picks",
            Self::AutoMix => "auto_mix",
        }
    }

    /// Minimum tier required for this feature
    ///
    /// Pass holders count as paid here; callers that additionally need an
    /// open activation window check `is_pass_active` separately.
    pub fn min_tier(&self) -> Tier {
        match self {
            Self::RatingsSummary | Self::BrokerCompare => Tier::Free,
            Self::FullRatings | Self::TopPicks | Self::EtfPicks | Self::AutoMix => Tier::Pass,
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feature access check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCheck {
    /// Whether access is allowed
    pub allowed: bool,
    /// Reason if denied
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Free.level() < Tier::Pass.level());
        assert!(Tier::Pass.level() < Tier::Plus.level());
    }

    #[test]
    fn test_tier_round_trip() {
        for tier in [Tier::Free, Tier::Pass, Tier::Plus] {
            assert_eq!(tier.to_string().parse::<Tier>().unwrap(), tier);
        }
        assert!("premium".parse::<Tier>().is_err());
    }

    #[test]
    fn test_paid_features_require_paid_tier() {
        for feature in [Feature::FullRatings, Feature::TopPicks, Feature::EtfPicks, Feature::AutoMix] {
            assert!(feature.min_tier().is_paid());
        }
        assert_eq!(Feature::RatingsSummary.min_tier(), Tier::Free);
    }
}
