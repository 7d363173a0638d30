//! Configuration for the verification orchestrator

use ekyc_shared::config::KycConfig;

/// Limits enforced by [`super::KycService`]
#[derive(Debug, Clone)]
pub struct KycServiceConfig {
    /// Seconds an issued OTP stays valid
    pub otp_expiration_seconds: i64,
    /// Failed provider verify calls allowed per record
    pub otp_max_attempts: u32,
    /// Largest decoded photo accepted for upload
    pub photo_max_size_bytes: usize,
}

impl Default for KycServiceConfig {
    fn default() -> Self {
        Self::from(&KycConfig::default())
    }
}

impl From<&KycConfig> for KycServiceConfig {
    fn from(config: &KycConfig) -> Self {
        Self {
            otp_expiration_seconds: config.otp_expiration_seconds,
            otp_max_attempts: config.otp_max_attempts,
            photo_max_size_bytes: config.photo_max_size_bytes(),
        }
    }
}
