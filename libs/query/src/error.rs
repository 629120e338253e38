//! Error types for query compilation and execution

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    /// A filter or pagination value failed validation. Raised before the store is touched.
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_retriable(&self) -> bool {
        match self {
            Self::InvalidInput { .. } => false,
            Self::Store(err) => err.is_retriable(),
        }
    }
}

/// Failures reported by a [`crate::PlanExecutor`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store query failed: {0}")]
    Query(String),

    #[error("Unexpected document in {collection}: {message}")]
    Decode { collection: String, message: String },
}

impl StoreError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Query(_))
    }
}
