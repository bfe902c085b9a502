use thiserror::Error;

/// Errors a domain service can return to its caller.
///
/// Repositories report failures as `anyhow::Error`; services classify
/// them so the REST layer can pick a response status without string
/// matching. Nothing below the REST layer swallows an error.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request was rejected before anything was written
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A lookup by identifier yielded nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with existing state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The underlying store failed
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        DomainError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        DomainError::Conflict(msg.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
