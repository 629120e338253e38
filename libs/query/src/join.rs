//! Join declarations.
//!
//! Joins are left joins: they attach related documents to each row and never remove
//! rows. Stale or non-coercible references attach nothing. Every join is restricted to
//! foreign documents of the same tenant as the plan; the compiler supplies the tenant.

use crate::clause::{Clause, FieldPath};

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub enum JoinSpec {
    /// `local` holds a list of ids; attach the referenced documents of `from` as an
    /// array at `as_field`, in list order.
    ManyById {
        local: FieldPath,
        from: &'static str,
        as_field: &'static str,
    },
    /// `within` holds an array of embedded documents (usually attached by an earlier
    /// join). For each object element, `local` is read from the element and the
    /// referenced documents of `from` are attached to it at `as_field`, in list order.
    NestedManyById {
        within: &'static str,
        local: FieldPath,
        from: &'static str,
        as_field: &'static str,
    },
    /// `local` holds a textual reference. It is coerced to an id (stored at `scaffold`,
    /// null when not coercible) and the single matching document of `from` is attached
    /// at `as_field`.
    OneByCoercedKey {
        local: &'static str,
        scaffold: &'static str,
        from: &'static str,
        as_field: &'static str,
    },
    /// Attach documents of `from` whose `foreign` id list contains this row's `_id` and
    /// which satisfy every clause of `filter`.
    ReferencedBy {
        from: &'static str,
        foreign: FieldPath,
        filter: Vec<Clause>,
        as_field: &'static str,
    },
}

impl JoinSpec {
    pub fn many_by_id(local: &str, from: &'static str, as_field: &'static str) -> Self {
        Self::ManyById {
            local: FieldPath::new(local),
            from,
            as_field,
        }
    }

    pub fn many_by_id_within(
        within: &'static str,
        local: &str,
        from: &'static str,
        as_field: &'static str,
    ) -> Self {
        Self::NestedManyById {
            within,
            local: FieldPath::new(local),
            from,
            as_field,
        }
    }

    pub fn one_by_coerced_key(
        local: &'static str,
        scaffold: &'static str,
        from: &'static str,
        as_field: &'static str,
    ) -> Self {
        Self::OneByCoercedKey {
            local,
            scaffold,
            from,
            as_field,
        }
    }

    pub fn referenced_by(
        from: &'static str,
        foreign: &str,
        filter: Vec<Clause>,
        as_field: &'static str,
    ) -> Self {
        Self::ReferencedBy {
            from,
            foreign: FieldPath::new(foreign),
            filter,
            as_field,
        }
    }

    pub fn from_collection(&self) -> &'static str {
        match self {
            Self::ManyById { from, .. }
            | Self::NestedManyById { from, .. }
            | Self::OneByCoercedKey { from, .. }
            | Self::ReferencedBy { from, .. } => from,
        }
    }

    /// Top-level fields this join writes on each row.
    pub fn writes(&self) -> Vec<&'static str> {
        match self {
            Self::ManyById { as_field, .. } | Self::ReferencedBy { as_field, .. } => {
                vec![as_field]
            }
            Self::NestedManyById { within, .. } => vec![within],
            Self::OneByCoercedKey {
                scaffold, as_field, ..
            } => vec![scaffold, as_field],
        }
    }
}
