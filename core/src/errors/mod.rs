//! Domain-specific error types and error handling.

mod types;

pub use types::{ErrorKind, KycError, RetryHint, ValidationError};

use thiserror::Error;

/// Core domain errors crossing every crate boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Request cancelled")]
    Cancelled,

    // Bridge to specific error types
    #[error(transparent)]
    Kyc(#[from] KycError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Category used for transport mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::ValidationErr(_) => ErrorKind::Validation,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Kyc(err) => err.kind(),
        }
    }

    /// How a caller should react to this rejection
    pub fn retry_hint(&self) -> RetryHint {
        match self {
            Self::Kyc(err) => err.retry_hint(),
            Self::Internal { .. } | Self::Cancelled => RetryHint::RetryLater,
            _ => RetryHint::None,
        }
    }

    /// Prefix the message with business context, keeping the category.
    ///
    /// Typed KYC rejections and cancellation carry no free-form message and pass through unchanged.
    pub fn context(self, context: &str) -> Self {
        match self {
            Self::Validation { message } => Self::Validation {
                message: format!("{}: {}", context, message),
            },
            Self::BadRequest { message } => Self::BadRequest {
                message: format!("{}: {}", context, message),
            },
            Self::NotFound { resource } => Self::NotFound {
                resource: format!("{}: {}", context, resource),
            },
            Self::Unauthorized { message } => Self::Unauthorized {
                message: format!("{}: {}", context, message),
            },
            Self::Forbidden { message } => Self::Forbidden {
                message: format!("{}: {}", context, message),
            },
            Self::Internal { message } => Self::Internal {
                message: format!("{}: {}", context, message),
            },
            other => other,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
