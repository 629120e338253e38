//! Renders a [`QueryPlan`] as one Postgres statement.
//!
//! Documents live in a single `documents` table as `jsonb`. Every filtering, joining
//! or projecting stage becomes a CTE reading from the previous one; sort and paging
//! apply to the final select. Field paths are rendered as lax jsonpath expressions
//! with `[*]` after every step, so array-valued fields are matched element-wise.
//!
//! Values are always bound, never spliced into the SQL text.

use convene_query::{
    Clause, Condition, FieldPath, JoinSpec, Predicate, Projection, QueryPlan, Scalar,
    SortDirection, SortKey, SortKind, Stage, TenantId,
};

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    TextArray(Vec<String>),
}

fn push_text(binds: &mut Vec<BindValue>, value: impl Into<String>) -> usize {
    binds.push(BindValue::Text(value.into()));
    binds.len()
}

fn push_text_array(binds: &mut Vec<BindValue>, value: Vec<String>) -> usize {
    binds.push(BindValue::TextArray(value));
    binds.len()
}

const OBJECT_ID_PATTERN: &str = "'^[0-9a-fA-F]{24}$'";
const TIMESTAMP_PATTERN: &str = r"'^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}'";

/// `lax $."a"[*]."b"[*]`
pub(crate) fn jsonpath(field: &FieldPath) -> String {
    let mut out = String::from("lax $");
    for segment in field.segments() {
        out.push_str(".\"");
        for c in segment.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push_str("\"[*]");
    }
    out
}

/// `ILIKE` pattern matching `needle` literally anywhere in the value.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

#[derive(Debug, Default)]
struct SqlWriter {
    binds: Vec<BindValue>,
    ctes: Vec<String>,
    order_by: Option<String>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl SqlWriter {
    fn current(&self) -> String {
        format!("s{}", self.ctes.len() - 1)
    }

    fn push_cte(&mut self, body: String) {
        let name = format!("s{}", self.ctes.len());
        self.ctes.push(format!("{name} AS ({body})"));
    }

    /// Typed view of a json value `v`, NULL when the stored type does not fit.
    fn typed_value(&self, value: &str, scalar: &Scalar) -> String {
        match scalar {
            Scalar::Text(_) => format!(
                "(CASE WHEN jsonb_typeof({value}) = 'string' THEN ({value} #>> '{{}}') END) COLLATE \"C\""
            ),
            Scalar::Id(_) => format!(
                "CASE WHEN jsonb_typeof({value}) = 'string' THEN lower({value} #>> '{{}}') END"
            ),
            Scalar::Int(_) => format!(
                "CASE WHEN jsonb_typeof({value}) = 'number' THEN ({value} #>> '{{}}')::numeric END"
            ),
            Scalar::Bool(_) => format!(
                "CASE WHEN jsonb_typeof({value}) = 'boolean' THEN ({value} #>> '{{}}')::boolean END"
            ),
            Scalar::Timestamp(_) => format!(
                "CASE WHEN jsonb_typeof({value}) = 'string' AND ({value} #>> '{{}}') ~ {TIMESTAMP_PATTERN} \
                 THEN ({value} #>> '{{}}')::timestamptz END"
            ),
        }
    }

    fn operand(&mut self, scalar: &Scalar) -> String {
        let idx = push_text(&mut self.binds, scalar.to_bind_text());
        match scalar {
            Scalar::Text(_) | Scalar::Id(_) => format!("${idx}"),
            Scalar::Int(_) => format!("${idx}::numeric"),
            Scalar::Bool(_) => format!("${idx}::boolean"),
            Scalar::Timestamp(_) => format!("${idx}::timestamptz"),
        }
    }

    fn value_predicate(&mut self, value: &str, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Equals(expected) => {
                let typed = self.typed_value(value, expected);
                format!("{typed} = {}", self.operand(expected))
            }
            Predicate::Range { lower, upper } => {
                let mut parts = Vec::new();
                if let Some(bound) = lower {
                    let typed = self.typed_value(value, bound);
                    parts.push(format!("{typed} >= {}", self.operand(bound)));
                }
                if let Some(bound) = upper {
                    let typed = self.typed_value(value, bound);
                    parts.push(format!("{typed} <= {}", self.operand(bound)));
                }
                if parts.is_empty() {
                    format!("jsonb_typeof({value}) <> 'null'")
                } else {
                    parts.join(" AND ")
                }
            }
            Predicate::ContainsIgnoreCase(needle) => {
                let idx = push_text(&mut self.binds, contains_pattern(needle));
                format!(
                    "jsonb_typeof({value}) = 'string' AND ({value} #>> '{{}}') ILIKE ${idx} ESCAPE '\\'"
                )
            }
            Predicate::InSet(options) => {
                if options.is_empty() {
                    return "FALSE".to_string();
                }
                let alternatives: Vec<String> = options
                    .iter()
                    .map(|option| {
                        let typed = self.typed_value(value, option);
                        format!("{typed} = {}", self.operand(option))
                    })
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
            Predicate::NonEmpty => format!("jsonb_typeof({value}) <> 'null'"),
        }
    }

    fn clause(&mut self, doc: &str, clause: &Clause) -> String {
        let path = push_text(&mut self.binds, jsonpath(&clause.field));
        let predicate = self.value_predicate("v", &clause.predicate);
        format!("EXISTS (SELECT 1 FROM jsonb_path_query({doc}, ${path}::jsonpath) AS v WHERE {predicate})")
    }

    fn condition(&mut self, doc: &str, condition: &Condition) -> String {
        match condition {
            Condition::Clause(clause) => self.clause(doc, clause),
            Condition::AnyOf(clauses) if clauses.is_empty() => "FALSE".to_string(),
            Condition::AnyOf(clauses) => {
                let parts: Vec<String> = clauses.iter().map(|c| self.clause(doc, c)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }

    fn match_stage(&mut self, conditions: &[Condition]) {
        let from = self.current();
        let predicate = if conditions.is_empty() {
            "TRUE".to_string()
        } else {
            conditions
                .iter()
                .map(|c| self.condition("doc", c))
                .collect::<Vec<_>>()
                .join(" AND ")
        };
        self.push_cte(format!("SELECT doc FROM {from} WHERE {predicate}"));
    }

    /// Array of the `collection` documents whose ids `local` lists in `source`, in list
    /// order with repeats dropped, `[]` when none resolve.
    fn resolve_many(
        &mut self,
        source: &str,
        local: &FieldPath,
        collection: usize,
        tenant: usize,
    ) -> String {
        let path = push_text(&mut self.binds, jsonpath(local));
        format!(
            "COALESCE((\
             SELECT jsonb_agg(f.doc ORDER BY r.ord) FROM (\
             SELECT lower(e.v #>> '{{}}') AS id, MIN(e.ord) AS ord \
             FROM jsonb_path_query({source}, ${path}::jsonpath) WITH ORDINALITY AS e(v, ord) \
             WHERE jsonb_typeof(e.v) = 'string' AND (e.v #>> '{{}}') ~ {OBJECT_ID_PATTERN} \
             GROUP BY 1) r \
             JOIN documents f ON f.collection = ${collection} AND f.tenant_id = ${tenant} AND f.id = r.id\
             ), '[]'::jsonb)"
        )
    }

    fn join_stage(&mut self, join: &JoinSpec, tenant: TenantId) {
        let from = self.current();
        let collection = push_text(&mut self.binds, join.from_collection());
        let tenant = push_text(&mut self.binds, tenant.to_string());

        let body = match join {
            JoinSpec::ManyById {
                local, as_field, ..
            } => {
                let joined = self.resolve_many("s.doc", local, collection, tenant);
                let name = push_text(&mut self.binds, *as_field);
                format!("SELECT s.doc || jsonb_build_object(${name}::text, {joined}) AS doc FROM {from} s")
            }
            JoinSpec::NestedManyById {
                within,
                local,
                as_field,
                ..
            } => {
                let within = push_text(&mut self.binds, *within);
                let joined = self.resolve_many("el.v", local, collection, tenant);
                let name = push_text(&mut self.binds, *as_field);
                format!(
                    "SELECT CASE WHEN jsonb_typeof(s.doc -> ${within}::text) = 'array' \
                     THEN s.doc || jsonb_build_object(${within}::text, COALESCE((\
                     SELECT jsonb_agg(CASE WHEN jsonb_typeof(el.v) = 'object' \
                     THEN el.v || jsonb_build_object(${name}::text, {joined}) \
                     ELSE el.v END ORDER BY el.ord) \
                     FROM jsonb_array_elements(CASE WHEN jsonb_typeof(s.doc -> ${within}::text) = 'array' \
                     THEN s.doc -> ${within}::text ELSE '[]'::jsonb END) WITH ORDINALITY AS el(v, ord)\
                     ), '[]'::jsonb)) ELSE s.doc END AS doc FROM {from} s"
                )
            }
            JoinSpec::OneByCoercedKey {
                local,
                scaffold,
                as_field,
                ..
            } => {
                let local = push_text(&mut self.binds, *local);
                let scaffold = push_text(&mut self.binds, *scaffold);
                let name = push_text(&mut self.binds, *as_field);
                format!(
                    "SELECT CASE WHEN f.doc IS NULL \
                     THEN (s.doc || jsonb_build_object(${scaffold}::text, k.key)) - ${name}::text \
                     ELSE s.doc || jsonb_build_object(${scaffold}::text, k.key, ${name}::text, f.doc) END AS doc \
                     FROM {from} s \
                     CROSS JOIN LATERAL (SELECT CASE \
                     WHEN jsonb_typeof(s.doc -> ${local}::text) = 'string' \
                     AND (s.doc ->> ${local}::text) ~ {OBJECT_ID_PATTERN} \
                     THEN to_jsonb(lower(s.doc ->> ${local}::text)) ELSE 'null'::jsonb END AS key) k \
                     LEFT JOIN documents f ON f.collection = ${collection} AND f.tenant_id = ${tenant} \
                     AND f.id = (k.key #>> '{{}}')"
                )
            }
            JoinSpec::ReferencedBy {
                foreign,
                filter,
                as_field,
                ..
            } => {
                let path = push_text(&mut self.binds, jsonpath(foreign));
                let name = push_text(&mut self.binds, *as_field);
                let mut predicate = format!(
                    "EXISTS (SELECT 1 FROM jsonb_path_query(f.doc, ${path}::jsonpath) AS v \
                     WHERE jsonb_typeof(v) = 'string' AND lower(v #>> '{{}}') = lower(s.doc ->> '_id'))"
                );
                for clause in filter {
                    predicate.push_str(" AND ");
                    predicate.push_str(&self.clause("f.doc", clause));
                }
                format!(
                    "SELECT s.doc || jsonb_build_object(${name}::text, COALESCE((\
                     SELECT jsonb_agg(f.doc ORDER BY f.id) FROM documents f \
                     WHERE f.collection = ${collection} AND f.tenant_id = ${tenant} AND {predicate}\
                     ), '[]'::jsonb)) AS doc FROM {from} s"
                )
            }
        };
        self.push_cte(body);
    }

    fn project_stage(&mut self, projection: &Projection) {
        let from = self.current();
        let mut expr = "doc".to_string();
        for derived in &projection.derive {
            let path = push_text(&mut self.binds, jsonpath(&derived.from));
            let name = push_text(&mut self.binds, derived.name);
            expr = format!(
                "(SELECT CASE WHEN x.v IS NULL THEN {expr} - ${name}::text \
                 ELSE {expr} || jsonb_build_object(${name}::text, x.v) END \
                 FROM (SELECT (SELECT v FROM jsonb_path_query(doc, ${path}::jsonpath) AS v \
                 WHERE jsonb_typeof(v) <> 'null' LIMIT 1) AS v) x)"
            );
        }
        for field in &projection.exclude {
            let idx = push_text(&mut self.binds, *field);
            expr = format!("({expr} - ${idx}::text)");
        }
        self.push_cte(format!("SELECT {expr} AS doc FROM {from}"));
    }

    fn sort_stage(&mut self, keys: &[SortKey]) {
        let terms: Vec<String> = keys
            .iter()
            .map(|key| {
                let idx = push_text_array(&mut self.binds, key.field.segments().to_vec());
                let direction = match key.direction {
                    SortDirection::Asc => "ASC NULLS FIRST",
                    SortDirection::Desc => "DESC NULLS LAST",
                };
                match key.kind {
                    SortKind::Text => format!("(doc #>> ${idx}::text[]) COLLATE \"C\" {direction}"),
                    SortKind::Timestamp => format!(
                        "(CASE WHEN jsonb_typeof(doc #> ${idx}::text[]) = 'string' \
                         AND (doc #>> ${idx}::text[]) ~ {TIMESTAMP_PATTERN} \
                         THEN (doc #>> ${idx}::text[])::timestamptz END) {direction}"
                    ),
                }
            })
            .collect();
        if !terms.is_empty() {
            self.order_by = Some(terms.join(", "));
        }
    }
}

fn write_stages(plan: &QueryPlan) -> SqlWriter {
    let mut writer = SqlWriter::default();
    let collection = push_text(&mut writer.binds, plan.collection);
    writer.push_cte(format!(
        "SELECT d.doc FROM documents d WHERE d.collection = ${collection}"
    ));

    for stage in &plan.stages {
        match stage {
            Stage::Match(conditions) => writer.match_stage(conditions),
            Stage::Join { join, tenant } => writer.join_stage(join, *tenant),
            Stage::Project(projection) => writer.project_stage(projection),
            Stage::Sort(keys) => writer.sort_stage(keys),
            Stage::Skip(n) => {
                writer.offset = Some(push_text(&mut writer.binds, n.to_string()));
            }
            Stage::Limit(n) => {
                writer.limit = Some(push_text(&mut writer.binds, n.to_string()));
            }
        }
    }
    writer
}

/// `SELECT doc` over the plan, sorted and paged.
pub fn render_fetch(plan: &QueryPlan) -> RenderedQuery {
    let writer = write_stages(plan);
    let mut sql = format!(
        "WITH {} SELECT doc FROM {}",
        writer.ctes.join(", "),
        writer.current()
    );
    if let Some(order_by) = &writer.order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }
    if let Some(idx) = writer.offset {
        sql.push_str(&format!(" OFFSET ${idx}::bigint"));
    }
    if let Some(idx) = writer.limit {
        sql.push_str(&format!(" LIMIT ${idx}::bigint"));
    }
    RenderedQuery {
        sql,
        binds: writer.binds,
    }
}

/// `SELECT COUNT(*)` over the plan. Sort and paging stages are ignored.
pub fn render_count(plan: &QueryPlan) -> RenderedQuery {
    let writer = write_stages(plan);
    RenderedQuery {
        sql: format!(
            "WITH {} SELECT COUNT(*) FROM {}",
            writer.ctes.join(", "),
            writer.current()
        ),
        binds: writer.binds,
    }
}
