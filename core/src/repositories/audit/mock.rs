//! Mock implementation of AuditLogRepository for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::AuditLogRepository;
use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainError;

/// In-memory audit repository with a failure toggle
#[derive(Clone, Default)]
pub struct MockAuditLogRepository {
    logs: Arc<Mutex<Vec<AuditLog>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether operations should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn get_all_logs(&self) -> Vec<AuditLog> {
        self.logs.lock().unwrap().clone()
    }

    /// Actions in write order
    pub fn actions(&self) -> Vec<String> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .map(|log| log.action.clone())
            .collect()
    }

    pub fn find_action(&self, action: &str) -> Option<AuditLog> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .find(|log| log.action == action)
            .cloned()
    }

    pub fn clear(&self) {
        self.logs.lock().unwrap().clear();
    }
}

#[async_trait]
impl AuditLogRepository for MockAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::internal("Mock repository error"));
        }
        self.logs.lock().unwrap().push(audit_log.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<AuditLog>, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::internal("Mock repository error"));
        }
        let mut result: Vec<AuditLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }
}
