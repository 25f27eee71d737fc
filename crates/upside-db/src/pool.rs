//! Connection pool setup

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Shared Postgres pool handed to every repository
pub type DbPool = PgPool;

/// Connect to Postgres with a bounded pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
