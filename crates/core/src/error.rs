use crate::types::DbId;

/// Domain error taxonomy shared by every layer of the backend.
///
/// The API crate maps these onto HTTP statuses: Validation -> 400,
/// NotFound -> 404, Forbidden -> 403, Unauthorized -> 401, Conflict -> 409,
/// Unavailable -> 503, Internal -> 500.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
