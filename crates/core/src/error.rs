use thiserror::Error;

use crate::types::DbId;

/// Domain-level errors shared across backend crates.
///
/// The API crate maps these onto HTTP statuses; repository code returns
/// them where a failure is a domain fact rather than a database fault.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    Internal(String),
}
