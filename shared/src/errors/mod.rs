//! Shared error types and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    pub message: String,

    /// How the caller should react: `retry_later`, `retry_now`, `terminal` or `none`
    pub retry_hint: String,

    /// Additional error details (remaining attempts, retry delay, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        retry_hint: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            retry_hint: retry_hint.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned to API clients
pub mod error_codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
    pub const CANCELLED: &str = "REQUEST_CANCELLED";
    pub const OTP_EXPIRED: &str = "OTP_EXPIRED";
    pub const OTP_ATTEMPTS_EXHAUSTED: &str = "OTP_ATTEMPTS_EXHAUSTED";
    pub const OTP_REJECTED: &str = "OTP_REJECTED";
    pub const ALREADY_VERIFIED: &str = "KYC_ALREADY_VERIFIED";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_detail() {
        let response = ErrorResponse::new(error_codes::OTP_REJECTED, "bad otp", "retry_now")
            .add_detail("attempts_remaining", 2);
        let details = response.details.unwrap();
        assert_eq!(details["attempts_remaining"], 2);
    }
}
