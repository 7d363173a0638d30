//! API response types and wrappers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success envelope; failures use `ErrorResponse`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    pub data: T,

    pub timestamp: DateTime<Utc>,

    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Health status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Body returned by the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,

    pub version: String,

    /// Whether provider credentials are configured
    pub provider_configured: bool,

    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(provider_configured: bool) -> Self {
        Self {
            status: if provider_configured {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            provider_configured,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("request_id").is_none());

        let json = serde_json::to_value(ApiResponse::success(42).with_request_id("req-1")).unwrap();
        assert_eq!(json["request_id"], "req-1");
    }

    #[test]
    fn test_health_degraded_without_provider() {
        assert_eq!(HealthResponse::new(false).status, HealthStatus::Degraded);
        assert_eq!(HealthResponse::new(true).status, HealthStatus::Healthy);
    }
}
