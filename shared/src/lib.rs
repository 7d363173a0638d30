//! Shared utilities and common types for the eKYC server
//!
//! This crate provides functionality used across all server crates:
//! - Configuration types loaded from the environment
//! - Error and response envelopes
//! - Masking and format validation helpers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, DatabaseConfig, Environment, KycConfig, LoggingConfig, PhotoStorageConfig,
    ProviderConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::ApiResponse;
pub use utils::{masking, validation};
