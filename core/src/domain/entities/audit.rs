//! Audit log entity for recording verification events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A single audit event produced by the verification flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    pub id: Uuid,

    /// Caller that triggered the event
    pub user_id: Uuid,

    /// Action being audited (see [`actions`])
    pub action: String,

    /// Kind of resource touched (see [`resource_types`])
    pub resource_type: String,

    /// Identifier of the touched resource, when one exists
    pub resource_id: Option<String>,

    pub success: bool,

    /// Error message if the action failed
    pub error_message: Option<String>,

    /// Structured event details
    pub details: JsonValue,

    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        user_id: Uuid,
        action: impl Into<String>,
        resource_type: impl Into<String>,
        success: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            success,
            error_message: None,
            details: JsonValue::Object(Default::default()),
            created_at: Utc::now(),
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        let id = resource_id.into();
        if !id.is_empty() {
            self.resource_id = Some(id);
        }
        self
    }

    /// Add error message and mark the event as failed
    pub fn with_error(mut self, error_message: impl Into<String>) -> Self {
        self.error_message = Some(error_message.into());
        self.success = false;
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = details;
        self
    }
}

/// Audit actions emitted by the verification flow
pub mod actions {
    pub const KYC_OTP_GENERATED: &str = "kyc_otp_generated";
    pub const KYC_OTP_GENERATION_FAILED: &str = "kyc_otp_generation_failed";
    pub const KYC_OTP_RATE_LIMITED: &str = "kyc_otp_rate_limited";
    pub const KYC_OTP_VERIFICATION_FAILED: &str = "kyc_otp_verification_failed";
    /// Caller tried to complete someone else's verification
    pub const KYC_OTP_VERIFICATION_UNAUTHORIZED: &str = "kyc_otp_verification_unauthorized";
    pub const KYC_OTP_EXPIRED: &str = "kyc_otp_expired";
    pub const KYC_OTP_MAX_ATTEMPTS_EXCEEDED: &str = "kyc_otp_max_attempts_exceeded";
    pub const KYC_OTP_ALREADY_VERIFIED: &str = "kyc_otp_already_verified";
    pub const KYC_PROFILE_UPDATE_FAILED: &str = "kyc_profile_update_failed";
    pub const KYC_RECORD_UPDATE_FAILED: &str = "kyc_record_update_failed";
    pub const KYC_VERIFIED: &str = "kyc_verified";
    pub const KYC_STATUS_CHECKED: &str = "kyc_status_checked";
}

pub mod resource_types {
    pub const KYC_VERIFICATION: &str = "kyc_verification";
    pub const USER_PROFILE: &str = "user_profile";
}
