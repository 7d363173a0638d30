//! Configuration module with service-specific sub-modules
//!
//! - `database` - MySQL connection pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `kyc` - OTP lifecycle limits for the verification flow
//! - `provider` - External verification provider credentials and retry policy
//! - `server` - HTTP server configuration
//! - `storage` - Photo storage and signed URL configuration

pub mod database;
pub mod environment;
pub mod kyc;
pub mod provider;
pub mod server;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use kyc::KycConfig;
pub use provider::ProviderConfig;
pub use server::ServerConfig;
pub use storage::PhotoStorageConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub environment: Environment,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Verification provider configuration
    pub provider: ProviderConfig,

    /// OTP lifecycle configuration
    pub kyc: KycConfig,

    /// Photo storage configuration
    #[serde(default)]
    pub storage: PhotoStorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            provider: ProviderConfig::default(),
            kyc: KycConfig::default(),
            storage: PhotoStorageConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load every sub-configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            provider: ProviderConfig::from_env(),
            kyc: KycConfig::from_env(),
            storage: PhotoStorageConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }
}

/// Read an environment variable and parse it, falling back to `default` when unset or invalid
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
