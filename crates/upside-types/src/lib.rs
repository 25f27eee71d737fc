//! Upside Types - Shared domain types
//!
//! This crate contains domain types used across Upside services:
//! - User identity
//! - Access tiers and feature gating
//! - Subscriptions and day passes
//! - The security read model consumed by the Auto-Mix allocator

pub mod user;
pub mod tier;
pub mod subscription;
pub mod pass;
pub mod security;

pub use user::*;
pub use tier::*;
pub use subscription::*;
pub use pass::*;
pub use security::*;
