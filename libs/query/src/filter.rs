//! Filter normalization: pagination policy and the normalized clause set.
//!
//! Callers translate their typed filter into a [`NormalizedFilter`] through
//! [`NormalizedFilterBuilder`]. Absent and blank values never produce clauses.

use crate::clause::{Clause, Condition, FieldPath, Predicate, Scalar};
use crate::error::{QueryError, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_MAX_LIMIT: u32 = 100;

/// Defaults and bounds applied to `page`/`limit` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl PaginationPolicy {
    /// Values below 1 and limits above `max_limit` are rejected, never clamped.
    pub fn resolve(&self, page: Option<i64>, limit: Option<i64>) -> Result<Pagination> {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(p) if p < 1 => return Err(QueryError::invalid("page", "must be at least 1")),
            Some(p) => u32::try_from(p).map_err(|_| QueryError::invalid("page", "is too large"))?,
        };
        let limit = match limit {
            None => self.default_limit,
            Some(l) if l < 1 => return Err(QueryError::invalid("limit", "must be at least 1")),
            Some(l) if l > i64::from(self.max_limit) => {
                return Err(QueryError::invalid(
                    "limit",
                    format!("must not exceed {}", self.max_limit),
                ))
            }
            Some(l) => l as u32,
        };
        Ok(Pagination { page, limit })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// `max(1, ceil(total / limit))`
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit)).max(1)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// The clause set a typed filter reduces to.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFilter {
    /// Tenant id named in the filter itself, if any. Checked against the caller's tenant.
    pub tenant_claim: Option<String>,
    /// Clauses over the entity's own fields, evaluated before joins.
    pub own: Vec<Condition>,
    /// Field-specific text filters. Dropped when a search term is present.
    pub text: Vec<Condition>,
    /// Clauses over joined data, evaluated after joins.
    pub post_join: Vec<Condition>,
    pub search: Option<String>,
    pub pagination: Pagination,
}

impl NormalizedFilter {
    pub fn builder(pagination: Pagination) -> NormalizedFilterBuilder {
        NormalizedFilterBuilder {
            filter: NormalizedFilter {
                tenant_claim: None,
                own: Vec::new(),
                text: Vec::new(),
                post_join: Vec::new(),
                search: None,
                pagination,
            },
        }
    }

    /// Field names this filter constrains, for logging. Values are never included.
    pub fn shape(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .own
            .iter()
            .chain(self.post_join.iter())
            .chain(self.text.iter())
            .flat_map(|c| c.fields().into_iter().map(FieldPath::to_string))
            .collect();
        if self.search.is_some() {
            fields.push("search".to_string());
        }
        if self.tenant_claim.is_some() {
            fields.push("tenantId".to_string());
        }
        fields.sort();
        fields.dedup();
        fields
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedFilterBuilder {
    filter: NormalizedFilter,
}

impl NormalizedFilterBuilder {
    pub fn tenant_claim(mut self, claim: Option<&str>) -> Self {
        self.filter.tenant_claim = non_blank(claim).map(str::to_string);
        self
    }

    pub fn equals(mut self, field: &str, value: Option<Scalar>) -> Self {
        if let Some(value) = value {
            self.filter
                .own
                .push(Clause::equals(field, value).into());
        }
        self
    }

    pub fn at_least(mut self, field: &str, bound: Option<Scalar>) -> Self {
        if let Some(bound) = bound {
            self.filter
                .own
                .push(Clause::new(field, Predicate::at_least(bound)).into());
        }
        self
    }

    pub fn at_most(mut self, field: &str, bound: Option<Scalar>) -> Self {
        if let Some(bound) = bound {
            self.filter
                .own
                .push(Clause::new(field, Predicate::at_most(bound)).into());
        }
        self
    }

    pub fn in_set(mut self, field: &str, options: Vec<Scalar>) -> Self {
        if !options.is_empty() {
            self.filter
                .own
                .push(Clause::new(field, Predicate::InSet(options)).into());
        }
        self
    }

    pub fn text(mut self, field: &str, needle: Option<&str>) -> Self {
        if let Some(needle) = non_blank(needle) {
            self.filter.text.push(Clause::contains(field, needle).into());
        }
        self
    }

    /// Text filter satisfied when any of `fields` contains the needle.
    pub fn text_any(mut self, fields: &[&str], needle: Option<&str>) -> Self {
        if let Some(needle) = non_blank(needle) {
            self.filter.text.push(Condition::AnyOf(
                fields.iter().map(|f| Clause::contains(*f, needle)).collect(),
            ));
        }
        self
    }

    /// One text filter satisfied when any present `(field, needle)` pair matches.
    /// Blank needles are dropped; nothing is added when all are blank.
    pub fn text_either(mut self, pairs: &[(&str, Option<&str>)]) -> Self {
        let clauses: Vec<Clause> = pairs
            .iter()
            .filter_map(|(field, needle)| {
                non_blank(*needle).map(|needle| Clause::contains(*field, needle))
            })
            .collect();
        if !clauses.is_empty() {
            self.filter.text.push(Condition::AnyOf(clauses));
        }
        self
    }

    pub fn joined(mut self, condition: impl Into<Condition>) -> Self {
        self.filter.post_join.push(condition.into());
        self
    }

    pub fn search(mut self, term: Option<&str>) -> Self {
        self.filter.search = non_blank(term).map(str::to_string);
        self
    }

    pub fn build(self) -> NormalizedFilter {
        self.filter
    }
}

/// Trimmed value, `None` when blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
