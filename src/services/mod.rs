use serde::Serialize;
use thiserror::Error;

use crate::forms::products::ProductFormError;
use crate::repository::errors::RepositoryError;
use crate::storage::StorageError;

pub mod products;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Internal,
}

/// Errors surfaced by the service layer to its callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Vec<String>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Extra information attached to a bad request, empty otherwise.
    pub fn details(&self) -> &[String] {
        match self {
            Self::BadRequest { details, .. } => details,
            _ => &[],
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound("Not found".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<ProductFormError> for ServiceError {
    fn from(value: ProductFormError) -> Self {
        match value {
            ProductFormError::Staging(message) => Self::Internal(message),
            other => Self::BadRequest {
                message: "Invalid request data".to_string(),
                details: other.details(),
            },
        }
    }
}
