//! Error types for the listing service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use convene_query::{QueryError, StoreError};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput { .. } => "INVALID_INPUT",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Unauthenticated(_) => "UNAUTHENTICATED",
            Error::Store(StoreError::Decode { .. }) => "INTERNAL",
            Error::Store(_) | Error::Database(_) => "STORE_UNAVAILABLE",
            Error::Internal(_) | Error::Other(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Store(StoreError::Decode { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Store(_) | Error::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_retriable(&self) -> bool {
        match self {
            Error::Store(err) => err.is_retriable(),
            Error::Database(_) => true,
            _ => false,
        }
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidInput { field, message } => Error::InvalidInput { field, message },
            QueryError::Store(err) => Error::Store(err),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::Store(StoreError::Decode { .. }) => {
                tracing::error!(error = %self, "Stored document does not match its model");
                "Internal server error".to_string()
            }
            Error::Store(_) | Error::Database(_) => {
                tracing::error!(error = %self, "Store error");
                "The data store is temporarily unavailable".to_string()
            }
            Error::Internal(_) | Error::Other(_) => {
                tracing::error!(error = %self, "Internal error");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let mut body = json!({
            "statusCode": status.as_u16(),
            "code": self.code(),
            "message": message,
            "retriable": self.is_retriable(),
        });
        if let Error::InvalidInput { field, .. } = &self {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}
