//! Error type for domain operations.

use crate::db::repository::RepositoryError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a domain operation. The first three variants carry the message
/// shown to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// A referenced client, room or reservation does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation or overlapping booking.
    #[error("{0}")]
    Conflict(String),

    /// The store failed for reasons unrelated to the request.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Translate a store error, turning not-found into `not_found_message`.
    pub fn from_lookup(err: RepositoryError, not_found_message: &str) -> Self {
        if err.is_not_found() {
            Self::not_found(not_found_message)
        } else {
            Self::Repository(err)
        }
    }

    /// Translate a store error, turning a unique violation into
    /// `conflict_message`.
    pub fn from_write(err: RepositoryError, conflict_message: &str) -> Self {
        if err.is_conflict() {
            Self::conflict(conflict_message)
        } else {
            Self::Repository(err)
        }
    }
}
