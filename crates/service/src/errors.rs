use thiserror::Error;

use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("no fields to update")]
    EmptyChangeset,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::InvalidIdentifier(_) => 1001,
            ServiceError::EmptyChangeset => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Db(_) => 1200,
        }
    }

    /// Client-side errors are never retried and never logged at error level.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Db(_))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidId(raw) => ServiceError::InvalidIdentifier(raw),
            ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(e: mongodb::error::Error) -> Self {
        ServiceError::Db(e.to_string())
    }
}
