//! Upside DB - Database abstractions
//!
//! SQLx-based database layer for Upside services.
//!
//! # Example
//!
//! ```rust,ignore
//! use upside_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/upside", 5).await?;
//! let repos = Repositories::new(pool);
//!
//! // Use repositories
//! let sub = repos.subscriptions.find_by_user_id(user_id).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, DbPool};
pub use repo::*;
