//! Free-text search expansion.

use crate::clause::{Clause, Condition, FieldPath};

/// Expands a search term into an OR-set of substring clauses over a fixed field set.
#[derive(Debug, Clone, Default)]
pub struct SearchClauseBuilder {
    fields: Vec<FieldPath>,
}

impl SearchClauseBuilder {
    pub fn new(fields: Vec<FieldPath>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldPath] {
        &self.fields
    }

    /// `None` for a blank term or an empty field set.
    pub fn build(&self, term: &str) -> Option<Condition> {
        let term = term.trim();
        if term.is_empty() || self.fields.is_empty() {
            return None;
        }
        Some(Condition::AnyOf(
            self.fields
                .iter()
                .map(|field| Clause::contains(field.clone(), term))
                .collect(),
        ))
    }
}
