use thiserror::Error;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors produced by the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("connection pool error: {0}")]
    Connection(#[from] diesel::r2d2::PoolError),
    #[error("database error: {0}")]
    Database(diesel::result::Error),
    #[error("row {id} is invalid: {reason}")]
    InvalidRow { id: i32, reason: &'static str },
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::NotFound => Self::NotFound,
            other => Self::Database(other),
        }
    }
}
