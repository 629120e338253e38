//! Postgres-backed plan execution.

use async_trait::async_trait;
use convene_query::{PlanExecutor, QueryPlan, StoreError};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::sql::{render_count, render_fetch, BindValue, RenderedQuery};

#[derive(Clone)]
pub struct PostgresPlanExecutor {
    pool: PgPool,
}

impl PostgresPlanExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::Decode {
            collection: "documents".to_string(),
            message: err.to_string(),
        },
        other => StoreError::Query(other.to_string()),
    }
}

#[async_trait]
impl PlanExecutor for PostgresPlanExecutor {
    async fn count(&self, plan: &QueryPlan) -> Result<u64, StoreError> {
        let RenderedQuery { sql, binds } = render_count(plan);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in binds {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::TextArray(vs) => query.bind(vs),
            };
        }

        let total = query.fetch_one(&self.pool).await.map_err(store_error)?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn fetch(&self, plan: &QueryPlan) -> Result<Vec<JsonValue>, StoreError> {
        let RenderedQuery { sql, binds } = render_fetch(plan);

        let mut query = sqlx::query_scalar::<_, JsonValue>(&sql);
        for value in binds {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::TextArray(vs) => query.bind(vs),
            };
        }

        let rows = query.fetch_all(&self.pool).await.map_err(store_error)?;
        tracing::trace!(collection = plan.collection, rows = rows.len(), "Fetched rows");
        Ok(rows)
    }
}
