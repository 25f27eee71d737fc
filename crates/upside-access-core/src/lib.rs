//! Upside Access Core - Entitlement business logic
//!
//! Resolves a user's effective access tier from subscription and day-pass
//! state, and manages the day-pass activation lifecycle. These are the only
//! entry points the rest of the application calls to read or change
//! entitlement state:
//!
//! - [`AccessService::resolve_tier`]
//! - [`AccessService::pass_info`]
//! - [`AccessService::is_pass_active`]
//! - [`AccessService::can_activate_pass`]
//! - [`AccessService::activate_pass_day`]
//! - [`AccessService::check_feature`]

pub mod activation;
pub mod clock;
pub mod entitlement;
pub mod error;
pub mod service;

pub use activation::{PassActivator, PASS_WINDOW_HOURS};
pub use clock::{Clock, SystemClock};
pub use entitlement::EntitlementResolver;
pub use error::AccessError;
pub use service::AccessService;
