//! Tenant-scoped query engine for document collections.
//!
//! A listing request flows through this crate in a fixed order:
//!
//! 1. The caller turns its typed filter into a [`NormalizedFilter`] (own-field clauses,
//!    field-specific text filters, post-join clauses, search term, pagination).
//! 2. [`PipelineCompiler`] resolves the tenant scope, expands search, attaches the
//!    entity's joins and projection, and produces an immutable [`CompiledPipeline`].
//! 3. [`PaginatedExecutor`] runs the count and page variants of the pipeline
//!    concurrently against a [`PlanExecutor`] and returns a [`Page`].
//!
//! The store itself is abstract. [`MemoryStore`] evaluates plans over in-memory JSON
//! documents; SQL backends translate [`QueryPlan`] stages into their own dialect.

#![forbid(unsafe_code)]

pub mod clause;
pub mod error;
pub mod executor;
pub mod filter;
pub mod id;
pub mod join;
pub mod memory;
pub mod plan;
pub mod search;
pub mod tenant;

pub use clause::{Clause, Condition, FieldPath, Predicate, Scalar};
pub use error::{QueryError, Result, StoreError};
pub use executor::{Page, PaginatedExecutor, PlanExecutor};
pub use filter::{NormalizedFilter, NormalizedFilterBuilder, Pagination, PaginationPolicy};
pub use id::{coerce_object_id, ForeignKey, IdError, ObjectId};
pub use join::JoinSpec;
pub use memory::MemoryStore;
pub use plan::{
    CompiledPipeline, CompiledQuery, DerivedField, EntityQuerySpec, PipelineCompiler,
    Projection, QueryPlan, SortDirection, SortKey, SortKind, Stage,
};
pub use search::SearchClauseBuilder;
pub use tenant::{TenantContext, TenantId, TenantScope};
