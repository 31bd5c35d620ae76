use crate::validate::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("document {0} not found")]
    NotFound(i64),

    /// The store slot could not be read or written.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
