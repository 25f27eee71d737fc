//! The Auto-Mix allocation algorithm
//!
//! Weights are linearly decreasing over the top four candidates (4/3/2/1)
//! and always normalized by the full weight sum of 10. With fewer than four
//! eligible candidates the missing ranks' share of the cash is deliberately
//! left unallocated rather than redistributed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use upside_types::{RiskBucket, RiskFilter, Security};

/// Number of holdings in a mix (design constant, not configurable)
pub const TOP_HOLDINGS: usize = 4;

/// Sum of the rank weights 4+3+2+1; fixed even when fewer candidates exist
const WEIGHT_DIVISOR: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// One allocated position in a mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol
    pub symbol: String,
    /// Risk bucket of the security
    pub risk: RiskBucket,
    /// Analyst upside in percent (the ranking key)
    pub upside: Decimal,
    /// Fraction of the cash amount assigned to this rank
    pub weight: Decimal,
    /// Cash assigned to this holding, in whole cents
    pub dollars: Decimal,
    /// Fractional shares purchasable, truncated to two decimals
    pub shares: Decimal,
    /// Cash actually spent (shares * price), in whole cents
    pub spend: Decimal,
}

/// Result of building a mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mix {
    /// Allocated holdings in rank order
    pub holdings: Vec<Holding>,
    /// Cash left over after all purchases
    pub cash: Decimal,
    /// Sum of per-holding spend
    pub total_invested: Decimal,
}

/// Build a weighted mix from ranked candidates
///
/// Total over its inputs: an empty candidate list (or one emptied by the
/// risk filter) yields no holdings and returns the full cash amount.
/// Rounding to cents happens per stage, per holding, so residuals from
/// fractional-share truncation accumulate into leftover cash instead of
/// drifting.
pub fn build_mix(candidates: &[Security], cash: Decimal, filter: RiskFilter) -> Mix {
    let mut picks: Vec<&Security> = candidates.iter().filter(|s| filter.allows(s.risk)).collect();
    // Stable sort: ties keep feed order, so identical inputs give identical output.
    picks.sort_by(|a, b| b.upside.cmp(&a.upside));
    picks.truncate(TOP_HOLDINGS);

    let mut holdings = Vec::with_capacity(picks.len());
    let mut total_invested = Decimal::ZERO;

    for (rank, security) in picks.iter().enumerate() {
        let weight = Decimal::from((TOP_HOLDINGS - rank) as u32) / WEIGHT_DIVISOR;
        let dollars = round_cents(cash * weight);
        let shares = if security.price > Decimal::ZERO {
            truncate_share(dollars / security.price)
        } else {
            Decimal::ZERO
        };
        let spend = round_cents(shares * security.price);
        total_invested += spend;

        holdings.push(Holding {
            symbol: security.symbol.clone(),
            risk: security.risk,
            upside: security.upside,
            weight,
            dollars,
            shares,
            spend,
        });
    }

    Mix {
        cash: round_cents(cash - total_invested),
        total_invested,
        holdings,
    }
}

/// Round to whole cents
fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Floor a share count to two decimals (fractional shares, never overspend)
fn truncate_share(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}
