//! # eKYC Core
//!
//! Domain layer for OTP-based identity verification.
//! This crate contains the verification entities, the error taxonomy, repository and
//! collaborator interfaces, and the orchestrator driving the issue/verify flow.

pub mod context;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use context::{CancelHandle, RequestContext};
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
