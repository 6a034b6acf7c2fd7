//! Persistence for the Folio gateway.
//!
//! - [`models`] -- entity structs, input DTOs and their gateway declarations.
//! - [`store`] -- the storage contract the gateway talks to.
//! - [`repositories`] + [`pg`] -- PostgreSQL implementation via sqlx.
//! - [`memory`] -- in-process implementation for tests and local runs.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::{Directory, Repository, Scope, Shelves, Store, StoreError, StoreResult};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to prove the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Applying database migrations");
    sqlx::migrate!("./migrations").run(pool).await
}
