//! Error categories and business rejections for the verification flow

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    BadRequest,
    RateLimited,
    Unauthorized,
    Forbidden,
    NotFound,
    Internal,
    Cancelled,
}

/// Caller guidance attached to every rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryHint {
    /// Wait, then request a fresh OTP
    RetryLater,
    /// Submit again straight away
    RetryNow,
    /// The current OTP cycle is over
    Terminal,
    /// Fix the request before retrying
    None,
}

impl RetryHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetryLater => "retry_later",
            Self::RetryNow => "retry_now",
            Self::Terminal => "terminal",
            Self::None => "none",
        }
    }
}

/// Business-rule rejections raised by the verification flow
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KycError {
    #[error("OTP expired after {elapsed_seconds}s (valid for {validity_seconds}s)")]
    OtpExpired {
        elapsed_seconds: i64,
        validity_seconds: i64,
    },

    #[error("Maximum OTP attempts exhausted ({attempts}/{max_attempts})")]
    AttemptsExhausted { attempts: u32, max_attempts: u32 },

    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after_seconds: Option<i64>,
    },

    #[error("OTP rejected: {message}")]
    OtpRejected {
        message: String,
        attempts_remaining: u32,
    },

    #[error("Verification already completed")]
    AlreadyVerified,

    #[error("Verification does not belong to the caller")]
    OwnershipViolation,
}

impl KycError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OtpExpired { .. }
            | Self::AttemptsExhausted { .. }
            | Self::OtpRejected { .. }
            | Self::AlreadyVerified => ErrorKind::BadRequest,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::OwnershipViolation => ErrorKind::Unauthorized,
        }
    }

    pub fn retry_hint(&self) -> RetryHint {
        match self {
            Self::OtpExpired { .. } | Self::RateLimited { .. } => RetryHint::RetryLater,
            Self::OtpRejected {
                attempts_remaining, ..
            } if *attempts_remaining > 0 => RetryHint::RetryNow,
            Self::OtpRejected { .. } | Self::AttemptsExhausted { .. } | Self::AlreadyVerified => {
                RetryHint::Terminal
            }
            Self::OwnershipViolation => RetryHint::None,
        }
    }
}

/// Input validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid consent: {reason}")]
    InvalidConsent { reason: String },
}
