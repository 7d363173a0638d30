//! Filesystem-backed photo store with signed, time-limited URLs.
//!
//! Photos live under `<root>/<user_id>/<file_name>`. The returned URL is
//! `<base>/<user_id>/<file_name>?expires=<unix>&signature=<hex>` where the signature is
//! `sha256(key|path|expires)`.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use ekyc_core::errors::DomainError;
use ekyc_core::repositories::PhotoStore;
use ekyc_shared::config::PhotoStorageConfig;

use crate::InfrastructureError;

pub struct FilesystemPhotoStore {
    root_dir: PathBuf,
    public_base_url: String,
    url_ttl_secs: i64,
    signing_key: String,
}

impl FilesystemPhotoStore {
    pub fn new(config: &PhotoStorageConfig) -> Self {
        if config.is_using_default_key() {
            tracing::warn!("Photo URLs are signed with the built-in key; set PHOTO_SIGNING_KEY");
        }
        Self {
            root_dir: config.root_dir.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            url_ttl_secs: config.url_ttl_secs,
            signing_key: config.signing_key.clone(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Check the signature and expiry of a URL issued by this store.
    ///
    /// Returns the relative `<user_id>/<file_name>` path on success.
    pub fn verify_signed_url(&self, url: &str) -> Result<String, DomainError> {
        let (path, query) = self.split_url(url)?;
        let query = query.ok_or_else(|| DomainError::Unauthorized {
            message: "photo URL is not signed".to_string(),
        })?;

        let mut expires = None;
        let mut signature = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", v)) => expires = v.parse::<i64>().ok(),
                Some(("signature", v)) => signature = Some(v),
                _ => {}
            }
        }

        let (expires, signature) = match (expires, signature) {
            (Some(e), Some(s)) => (e, s),
            _ => {
                return Err(DomainError::Unauthorized {
                    message: "photo URL is missing expires or signature".to_string(),
                })
            }
        };

        let provided = hex::decode(signature).map_err(|_| DomainError::Unauthorized {
            message: "photo URL signature is not valid hex".to_string(),
        })?;
        if !constant_time_eq(&self.digest(&path, expires), &provided) {
            return Err(DomainError::Unauthorized {
                message: "photo URL signature mismatch".to_string(),
            });
        }
        if Utc::now().timestamp() > expires {
            return Err(DomainError::Unauthorized {
                message: "photo URL has expired".to_string(),
            });
        }
        Ok(path)
    }

    fn digest(&self, path: &str, expires: i64) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_key.as_bytes());
        hasher.update(b"|");
        hasher.update(path.as_bytes());
        hasher.update(b"|");
        hasher.update(expires.to_string().as_bytes());
        hasher.finalize().to_vec()
    }

    fn sign(&self, path: &str, expires: i64) -> String {
        hex::encode(self.digest(path, expires))
    }

    fn signed_url(&self, path: &str) -> String {
        let expires = (Utc::now() + Duration::seconds(self.url_ttl_secs)).timestamp();
        format!(
            "{}/{}?expires={}&signature={}",
            self.public_base_url,
            path,
            expires,
            self.sign(path, expires)
        )
    }

    /// Split a URL from this store into its relative path and query string
    fn split_url<'a>(&self, url: &'a str) -> Result<(String, Option<&'a str>), DomainError> {
        let rest = url
            .strip_prefix(self.public_base_url.as_str())
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| DomainError::validation("photo URL does not belong to this store"))?;

        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (rest, None),
        };
        if path.split('/').any(|segment| segment.is_empty() || segment == "..") {
            return Err(DomainError::validation("invalid photo path"));
        }
        Ok((path.to_string(), query))
    }
}

fn validate_file_name(file_name: &str) -> Result<(), DomainError> {
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..")
    {
        return Err(DomainError::validation(format!("invalid photo file name '{}'", file_name)));
    }
    Ok(())
}

#[async_trait]
impl PhotoStore for FilesystemPhotoStore {
    async fn upload(&self, user_id: Uuid, bytes: &[u8], file_name: &str) -> Result<String, DomainError> {
        validate_file_name(file_name)?;

        let dir = self.root_dir.join(user_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(InfrastructureError::from)?;
        tokio::fs::write(dir.join(file_name), bytes)
            .await
            .map_err(InfrastructureError::from)?;

        tracing::debug!(user_id = %user_id, file_name, size = bytes.len(), "Photo written");
        Ok(self.signed_url(&format!("{}/{}", user_id, file_name)))
    }

    async fn delete(&self, url: &str) -> Result<(), DomainError> {
        let (path, _) = self.split_url(url)?;
        match tokio::fs::remove_file(self.root_dir.join(&path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DomainError::not_found(format!("photo {}", path)))
            }
            Err(e) => Err(InfrastructureError::from(e).into()),
        }
    }
}
