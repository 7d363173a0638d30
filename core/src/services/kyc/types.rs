//! Inputs and results of the verification use cases

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Address, Contact, UserProfile, VerificationStatus};
use crate::domain::value_objects::{ConsentInput, KycData};

/// Request to start a verification
#[derive(Debug, Clone)]
pub struct GenerateOtpRequest {
    pub subject_number: String,
    pub consent: ConsentInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOtpResult {
    pub verification_id: Uuid,
    pub reference_id: String,
    pub transaction_id: String,
    pub message: String,
    /// Last instant at which the OTP is accepted
    pub expires_at: DateTime<Utc>,
}

/// Request to complete a verification
#[derive(Debug, Clone)]
pub struct VerifyOtpRequest {
    pub reference_id: String,
    pub otp: String,
}

/// Best-effort step performed after the provider accepted the OTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    AttemptLog,
    PhotoUpload,
    AddressResolution,
    ProfileRefetch,
    AddressRefetch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SideEffectStatus {
    Completed,
    Skipped { reason: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffectOutcome {
    pub effect: SideEffect,
    #[serde(flatten)]
    pub status: SideEffectStatus,
}

impl SideEffectOutcome {
    pub fn completed(effect: SideEffect) -> Self {
        Self {
            effect,
            status: SideEffectStatus::Completed,
        }
    }

    pub fn skipped(effect: SideEffect, reason: impl Into<String>) -> Self {
        Self {
            effect,
            status: SideEffectStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(effect: SideEffect, message: impl Into<String>) -> Self {
        Self {
            effect,
            status: SideEffectStatus::Failed {
                message: message.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, SideEffectStatus::Failed { .. })
    }
}

/// Outcome of a successful verification
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpResult {
    pub verification_id: Uuid,
    pub reference_id: String,
    /// Owner of the verified profile
    pub profile_id: Uuid,
    pub kyc_data: KycData,
    pub photo_url: Option<String>,
    pub address_id: Option<Uuid>,
    /// Re-fetched after the update; absent if the re-fetch failed
    pub profile: Option<UserProfile>,
    pub address: Option<Address>,
    /// Always empty; contacts are not sourced from the provider
    pub contacts: Vec<Contact>,
    pub side_effects: Vec<SideEffectOutcome>,
}

impl VerifyOtpResult {
    pub fn side_effect(&self, effect: SideEffect) -> Option<&SideEffectStatus> {
        self.side_effects
            .iter()
            .find(|outcome| outcome.effect == effect)
            .map(|outcome| &outcome.status)
    }
}

/// Latest verification state for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycStatusView {
    pub kyc_status: VerificationStatus,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
}
