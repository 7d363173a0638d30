//! Append-only history of provider verify calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptOutcome {
    Success,
    Failed,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One provider verify call made against a verification record. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpAttemptLog {
    pub id: Uuid,
    pub verification_id: Uuid,
    /// 1-based position of this call within the record's lifecycle
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OtpAttemptLog {
    pub fn succeeded(verification_id: Uuid, attempt_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            verification_id,
            attempt_number,
            outcome: AttemptOutcome::Success,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(verification_id: Uuid, attempt_number: u32, error: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            verification_id,
            attempt_number,
            outcome: AttemptOutcome::Failed,
            error_message: Some(error.into()),
            created_at: Utc::now(),
        }
    }
}
