//! Paginated execution of compiled pipelines.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::filter::Pagination;
use crate::plan::{CompiledPipeline, CompiledQuery, QueryPlan};

/// A store able to evaluate [`QueryPlan`]s.
///
/// Implementations must apply stages in order and honor the join tenant on every
/// `Join` stage. Both methods are read-only.
#[async_trait]
pub trait PlanExecutor: Send + Sync {
    /// Number of rows produced by `plan`.
    async fn count(&self, plan: &QueryPlan) -> std::result::Result<u64, StoreError>;

    /// Rows produced by `plan`, in order.
    async fn fetch(&self, plan: &QueryPlan) -> std::result::Result<Vec<JsonValue>, StoreError>;
}

/// A page of results with its pagination envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page(),
            limit: pagination.limit(),
            total_pages: pagination.total_pages(total),
        }
    }

    pub fn empty(pagination: Pagination) -> Self {
        Self::new(Vec::new(), 0, pagination)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }

    pub fn try_map<U, E>(
        self,
        f: impl FnMut(T) -> std::result::Result<U, E>,
    ) -> std::result::Result<Page<U>, E> {
        let items = self
            .items
            .into_iter()
            .map(f)
            .collect::<std::result::Result<Vec<_>, E>>()?;
        Ok(Page {
            items,
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        })
    }
}

/// Runs the count and page variants of a pipeline concurrently.
pub struct PaginatedExecutor {
    store: Arc<dyn PlanExecutor>,
}

impl PaginatedExecutor {
    pub fn new(store: Arc<dyn PlanExecutor>) -> Self {
        Self { store }
    }

    pub async fn run(&self, query: CompiledQuery) -> Result<Page<JsonValue>> {
        match query {
            CompiledQuery::Empty { entity, pagination } => {
                tracing::debug!(entity, "Tenant claim mismatch, returning empty page");
                Ok(Page::empty(pagination))
            }
            CompiledQuery::Pipeline(pipeline) => self.run_pipeline(&pipeline).await,
        }
    }

    pub async fn run_pipeline(&self, pipeline: &CompiledPipeline) -> Result<Page<JsonValue>> {
        let count_plan = pipeline.count_plan();
        let page_plan = pipeline.page_plan();

        let (total, items) = tokio::try_join!(
            self.store.count(&count_plan),
            self.store.fetch(&page_plan)
        )?;

        tracing::debug!(
            entity = pipeline.entity(),
            tenant = %pipeline.tenant(),
            total,
            returned = items.len(),
            page = pipeline.pagination().page(),
            "Executed paginated pipeline"
        );

        Ok(Page::new(items, total, pipeline.pagination()))
    }

    /// First row of the pipeline's page plan, if any.
    pub async fn first(&self, pipeline: &CompiledPipeline) -> Result<Option<JsonValue>> {
        let rows = self.store.fetch(&pipeline.page_plan()).await?;
        Ok(rows.into_iter().next())
    }
}
