//! OTP lifecycle configuration for identity verification

use serde::{Deserialize, Serialize};

use super::env_or;

/// Limits applied by the verification orchestrator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KycConfig {
    /// Seconds an issued OTP stays valid
    pub otp_expiration_seconds: i64,

    /// Failed verify calls allowed per issued OTP
    pub otp_max_attempts: u32,

    /// Window for counting OTP issue requests per subject number
    pub otp_cooldown_seconds: i64,

    /// Issue requests allowed per subject number inside the cooldown window
    pub otp_max_issues_per_window: usize,

    /// Largest decoded photo accepted from the provider, in megabytes
    pub photo_max_size_mb: usize,
}

impl Default for KycConfig {
    fn default() -> Self {
        Self {
            otp_expiration_seconds: 300,
            otp_max_attempts: 3,
            otp_cooldown_seconds: 60,
            otp_max_issues_per_window: 3,
            photo_max_size_mb: 5,
        }
    }
}

impl KycConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            otp_expiration_seconds: env_or("OTP_EXPIRATION_SECONDS", defaults.otp_expiration_seconds),
            otp_max_attempts: env_or("OTP_MAX_ATTEMPTS", defaults.otp_max_attempts),
            otp_cooldown_seconds: env_or("OTP_COOLDOWN_SECONDS", defaults.otp_cooldown_seconds),
            otp_max_issues_per_window: env_or(
                "OTP_MAX_ISSUES_PER_WINDOW",
                defaults.otp_max_issues_per_window,
            ),
            photo_max_size_mb: env_or("PHOTO_MAX_SIZE_MB", defaults.photo_max_size_mb),
        }
    }

    pub fn photo_max_size_bytes(&self) -> usize {
        self.photo_max_size_mb * 1024 * 1024
    }
}
