//! Upside Mix Core - Auto-Mix portfolio allocator
//!
//! A pure, deterministic allocation over a candidate list of ranked
//! securities: filter by risk, rank by analyst upside, and split a cash
//! amount across the top picks with skew-to-leader weights. No I/O, no
//! clock, no error conditions.

pub mod allocator;

pub use allocator::{build_mix, Holding, Mix, TOP_HOLDINGS};
