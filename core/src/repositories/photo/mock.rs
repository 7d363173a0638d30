use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::PhotoStore;
use crate::errors::DomainError;

/// In-memory photo store keyed by URL
#[derive(Clone, Default)]
pub struct MockPhotoStore {
    photos: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn stored(&self, url: &str) -> Option<Vec<u8>> {
        self.photos.lock().unwrap().get(url).cloned()
    }

    pub fn count(&self) -> usize {
        self.photos.lock().unwrap().len()
    }
}

#[async_trait]
impl PhotoStore for MockPhotoStore {
    async fn upload(&self, user_id: Uuid, bytes: &[u8], file_name: &str) -> Result<String, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::internal("Mock photo store error"));
        }
        let url = format!("mock://photos/{}/{}", user_id, file_name);
        self.photos.lock().unwrap().insert(url.clone(), bytes.to_vec());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), DomainError> {
        match self.photos.lock().unwrap().remove(url) {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(format!("photo {}", url))),
        }
    }
}
