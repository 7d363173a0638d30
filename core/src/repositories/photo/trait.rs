use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainError;

/// Stores photo bytes and hands back a time-limited URL
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store `bytes` for `user_id` under `file_name`; returns a retrievable URL with bounded validity
    async fn upload(&self, user_id: Uuid, bytes: &[u8], file_name: &str) -> Result<String, DomainError>;

    /// Remove a photo previously returned by [`PhotoStore::upload`]
    async fn delete(&self, url: &str) -> Result<(), DomainError>;
}
