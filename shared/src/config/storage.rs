//! Photo storage configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::env_or;

/// Where verified photos are written and how their URLs are signed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhotoStorageConfig {
    /// Root directory for stored photos
    pub root_dir: PathBuf,

    /// Public base URL that serves `root_dir`
    pub public_base_url: String,

    /// Lifetime of a signed photo URL in seconds
    pub url_ttl_secs: i64,

    /// Key mixed into URL signatures
    pub signing_key: String,
}

impl Default for PhotoStorageConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("data/photos"),
            public_base_url: String::from("http://localhost:8080/photos"),
            url_ttl_secs: 3600,
            signing_key: String::from("change-me-photo-signing-key"),
        }
    }
}

impl PhotoStorageConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            root_dir: std::env::var("PHOTO_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.root_dir),
            public_base_url: std::env::var("PHOTO_PUBLIC_BASE_URL")
                .unwrap_or(defaults.public_base_url),
            url_ttl_secs: env_or("PHOTO_URL_TTL_SECS", defaults.url_ttl_secs),
            signing_key: std::env::var("PHOTO_SIGNING_KEY").unwrap_or(defaults.signing_key),
        }
    }

    /// Check if using the built-in signing key
    pub fn is_using_default_key(&self) -> bool {
        self.signing_key == Self::default().signing_key
    }
}
