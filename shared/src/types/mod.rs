//! Type definitions shared by the HTTP layer
//!
//! - `response` - API response wrapper and health check body

pub mod response;

pub use response::{ApiResponse, HealthResponse, HealthStatus};
