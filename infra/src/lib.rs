//! # Infrastructure Layer
//!
//! Concrete implementations of the ports defined in `ekyc_core`:
//!
//! - **Provider**: reqwest client for the e-KYC provider with a shared access token
//!   and a retrying request executor
//! - **Database**: MySQL repositories using SQLx for verification records, attempt
//!   history, audit logs, profiles and addresses
//! - **Storage**: filesystem photo store issuing signed, time-limited URLs
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use ekyc_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Verification provider client
pub mod provider;

/// Photo storage
pub mod storage;

pub use provider::SandboxClient;
pub use storage::FilesystemPhotoStore;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem error from photo storage
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
