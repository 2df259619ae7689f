use thiserror::Error;

use crate::database::DatabaseError;
use crate::services::media::MediaError;

/// Business-rule failures raised by the services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before anything was written; `field` names the
    /// offending request field
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Shopping cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Media(MediaError),

    #[error("Password hashing failed: {0}")]
    Password(String),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The request field a validation error points at
    pub fn field(&self) -> Option<&str> {
        match self {
            ServiceError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<MediaError> for ServiceError {
    fn from(err: MediaError) -> Self {
        if err.is_client_error() {
            ServiceError::validation("image", err.to_string())
        } else {
            ServiceError::Media(err)
        }
    }
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ServiceError::Password(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
