//! Database module: models, schema and repositories for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `patch.rs` / `patch_impl.rs`: insert payloads and COALESCE-based partial updates
//! - `page.rs`: offset pagination
//! - `query.rs`: table-generic helpers and the dynamic WHERE builder
//! - `store/`: one repository per resource

pub mod models;
pub mod page;
pub mod patch;
pub mod query;
pub mod schema;
pub mod store;

mod patch_impl;

pub use models::{
    DbAccount, DbBanner, DbBasketItem, DbCategory, DbOrder, DbProduct, DbProductSize, DbReview,
    DbSample, DbSubcategory, OrderProduct, ProductView, SubcategoryView,
};
pub use page::{Page, PageRequest};
pub use patch::DbPatchable;
pub use schema::SQLITE_INIT;
pub use store::{
    AccountKind, AccountRepo, BannerRepo, BasketKind, BasketRepo, CategoryRepo, OrderRepo,
    ProductFilter, ProductRepo, ProductSizeRepo, Repositories, ReviewRepo, SampleRepo,
    SubcategoryRepo,
};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::EmporiumError;

/// Opens (creating if missing) the SQLite database and applies the schema.
pub async fn connect(database_url: &str) -> Result<SqlitePool, EmporiumError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    apply_schema(&pool).await?;

    info!(database_url, "database initialized");
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), EmporiumError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
