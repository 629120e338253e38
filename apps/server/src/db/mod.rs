//! Database layer - connection pool, migrations and plan execution

pub mod sql;
pub mod store;

pub use store::PostgresPlanExecutor;

use anyhow::Context as _;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let statement_timeout = format!("{}s", config.statement_timeout_seconds);
    let options = PgConnectOptions::from_str(&config.url)
        .context("parse database.url")?
        .options([("statement_timeout", statement_timeout.as_str())]);

    let pool = PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
        .connect_with(options)
        .await
        .context("connect to database")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
