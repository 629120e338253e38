//! Pipeline compilation.
//!
//! Stage order is fixed:
//!
//! 1. `Match` on the tenant clause and the entity's own fields
//! 2. `Join` for every join the entity declares
//! 3. `Match` on search and joined-data clauses (omitted when empty)
//! 4. `Project` derived fields in, join scaffolding out
//! 5. `Sort` by the entity's default order, `_id` as tie breaker
//!
//! The count variant stops after stage 3 and drops joins no later match reads.
//! The page variant appends `Skip` and `Limit`.

use crate::clause::{Clause, Condition, FieldPath, Scalar};
use crate::filter::{NormalizedFilter, Pagination};
use crate::id::ObjectId;
use crate::join::{JoinSpec, ID_FIELD};
use crate::search::SearchClauseBuilder;
use crate::tenant::{TenantContext, TenantId, TenantScope};

/// Per-entity query shape. One implementation per listing call site.
pub trait EntityQuerySpec: Send + Sync {
    /// Short entity name used in logs.
    fn entity(&self) -> &'static str;

    fn collection(&self) -> &'static str;

    fn joins(&self) -> Vec<JoinSpec> {
        Vec::new()
    }

    fn search_fields(&self) -> Vec<FieldPath> {
        Vec::new()
    }

    fn projection(&self) -> Projection {
        Projection::default()
    }

    fn default_sort(&self) -> Vec<SortKey>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedField {
    pub name: &'static str,
    pub from: FieldPath,
}

/// Reshapes each row: derived fields take the first value found at their source path
/// (absent when there is none), then excluded top-level fields are removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub derive: Vec<DerivedField>,
    pub exclude: Vec<&'static str>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn derive(mut self, name: &'static str, from: &str) -> Self {
        self.derive.push(DerivedField {
            name,
            from: FieldPath::new(from),
        });
        self
    }

    pub fn exclude(mut self, field: &'static str) -> Self {
        self.exclude.push(field);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.derive.is_empty() && self.exclude.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// How sort values compare. Text compares in byte order; timestamps compare as
/// instants, and a value that does not parse as one sorts as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKind {
    #[default]
    Text,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: FieldPath,
    pub direction: SortDirection,
    pub kind: SortKind,
}

impl SortKey {
    pub fn asc(field: &str) -> Self {
        Self {
            field: FieldPath::new(field),
            direction: SortDirection::Asc,
            kind: SortKind::Text,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: FieldPath::new(field),
            direction: SortDirection::Desc,
            kind: SortKind::Text,
        }
    }

    /// Compare this key's values as instants.
    pub fn timestamp(mut self) -> Self {
        self.kind = SortKind::Timestamp;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Vec<Condition>),
    Join { join: JoinSpec, tenant: TenantId },
    Project(Projection),
    Sort(Vec<SortKey>),
    Skip(u64),
    Limit(u64),
}

/// An executable stage list over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub collection: &'static str,
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPipeline {
    entity: &'static str,
    collection: &'static str,
    tenant: TenantId,
    stages: Vec<Stage>,
    pagination: Pagination,
    shape: Vec<String>,
}

impl CompiledPipeline {
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Constrained field names, for logging.
    pub fn shape(&self) -> &[String] {
        &self.shape
    }

    pub fn count_plan(&self) -> QueryPlan {
        let filtering: Vec<&Stage> = self
            .stages
            .iter()
            .take_while(|s| !matches!(s, Stage::Project(_) | Stage::Sort(_)))
            .collect();

        let mut stages = Vec::with_capacity(filtering.len());
        for (idx, stage) in filtering.iter().enumerate() {
            if let Stage::Join { join, .. } = stage {
                let writes = join.writes();
                let read_later = filtering[idx + 1..].iter().any(|later| match later {
                    Stage::Match(conditions) => conditions
                        .iter()
                        .flat_map(Condition::fields)
                        .any(|f| writes.iter().any(|w| *w == f.root())),
                    _ => false,
                });
                if !read_later {
                    continue;
                }
            }
            stages.push((*stage).clone());
        }

        QueryPlan {
            collection: self.collection,
            stages,
        }
    }

    pub fn page_plan(&self) -> QueryPlan {
        let mut stages = self.stages.clone();
        let skip = self.pagination.skip();
        if skip > 0 {
            stages.push(Stage::Skip(skip));
        }
        stages.push(Stage::Limit(u64::from(self.pagination.limit())));
        QueryPlan {
            collection: self.collection,
            stages,
        }
    }
}

/// Result of compilation: either a runnable pipeline or a request that is known to
/// match nothing (foreign tenant claim).
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledQuery {
    Pipeline(CompiledPipeline),
    Empty {
        entity: &'static str,
        pagination: Pagination,
    },
}

pub struct PipelineCompiler;

impl PipelineCompiler {
    pub fn compile(
        spec: &dyn EntityQuerySpec,
        ctx: &TenantContext,
        filter: NormalizedFilter,
    ) -> CompiledQuery {
        let shape = filter.shape();
        let (tenant, tenant_clause) =
            match TenantScope::resolve(ctx, filter.tenant_claim.as_deref()) {
                TenantScope::Scoped { tenant, clause } => (tenant, clause),
                TenantScope::Mismatch => {
                    return CompiledQuery::Empty {
                        entity: spec.entity(),
                        pagination: filter.pagination,
                    }
                }
            };

        let search = filter
            .search
            .as_deref()
            .and_then(|term| SearchClauseBuilder::new(spec.search_fields()).build(term));

        let mut own: Vec<Condition> = Vec::with_capacity(1 + filter.own.len());
        own.push(tenant_clause.into());
        own.extend(filter.own);
        if search.is_none() {
            own.extend(filter.text);
        }

        let mut post_join: Vec<Condition> = Vec::new();
        post_join.extend(search);
        post_join.extend(filter.post_join);

        CompiledQuery::Pipeline(Self::assemble(
            spec,
            tenant,
            own,
            post_join,
            filter.pagination,
            shape,
        ))
    }

    /// Single-document lookup by `_id`, with the entity's joins and projection.
    pub fn compile_lookup(
        spec: &dyn EntityQuerySpec,
        ctx: &TenantContext,
        id: ObjectId,
    ) -> CompiledPipeline {
        let own = vec![
            ctx.tenant_id.clause().into(),
            Clause::equals(ID_FIELD, Scalar::Id(id)).into(),
        ];
        Self::assemble(
            spec,
            ctx.tenant_id,
            own,
            Vec::new(),
            Pagination::first(1),
            vec![ID_FIELD.to_string()],
        )
    }

    fn assemble(
        spec: &dyn EntityQuerySpec,
        tenant: TenantId,
        own: Vec<Condition>,
        post_join: Vec<Condition>,
        pagination: Pagination,
        shape: Vec<String>,
    ) -> CompiledPipeline {
        let mut stages = vec![Stage::Match(own)];
        stages.extend(
            spec.joins()
                .into_iter()
                .map(|join| Stage::Join { join, tenant }),
        );
        if !post_join.is_empty() {
            stages.push(Stage::Match(post_join));
        }

        let projection = spec.projection();
        if !projection.is_identity() {
            stages.push(Stage::Project(projection));
        }

        let mut sort = spec.default_sort();
        if !sort.iter().any(|k| k.field.root() == ID_FIELD) {
            sort.push(SortKey::asc(ID_FIELD));
        }
        stages.push(Stage::Sort(sort));

        CompiledPipeline {
            entity: spec.entity(),
            collection: spec.collection(),
            tenant,
            stages,
            pagination,
            shape,
        }
    }
}
