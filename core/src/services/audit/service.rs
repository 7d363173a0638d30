//! Audit service turning verification events into persisted audit logs.
//!
//! Writes run on a background task by default so a slow or failing audit
//! store never blocks the verification flow.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use super::AuditSink;
use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainResult;
use crate::repositories::AuditLogRepository;

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Whether to run audit writes on a spawned task
    pub async_writes: bool,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self { async_writes: true }
    }
}

/// Service writing audit logs through an [`AuditLogRepository`]
pub struct AuditService<R>
where
    R: AuditLogRepository,
{
    repository: Arc<R>,
    config: AuditServiceConfig,
}

impl<R> AuditService<R>
where
    R: AuditLogRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Get recent audit logs for a user
    pub async fn get_user_audit_logs(&self, user_id: Uuid, limit: usize) -> DomainResult<Vec<AuditLog>> {
        self.repository.find_by_user(user_id, limit).await
    }

    async fn write_log(&self, audit_log: AuditLog) {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            task::spawn(async move {
                if let Err(e) = repository.create(&audit_log).await {
                    tracing::error!(
                        error = %e,
                        action = %audit_log.action,
                        user_id = %audit_log.user_id,
                        "Failed to write audit log"
                    );
                }
            });
        } else if let Err(e) = self.repository.create(&audit_log).await {
            tracing::error!(
                error = %e,
                action = %audit_log.action,
                user_id = %audit_log.user_id,
                "Failed to write audit log"
            );
        }
    }
}

#[async_trait]
impl<R> AuditSink for AuditService<R>
where
    R: AuditLogRepository + 'static,
{
    async fn log_user_action(
        &self,
        user_id: Uuid,
        action: &str,
        resource_type: &str,
        resource_id: &str,
        details: JsonValue,
    ) {
        let log = AuditLog::new(user_id, action, resource_type, true)
            .with_resource_id(resource_id)
            .with_details(details);
        self.write_log(log).await;
    }

    async fn log_user_action_with_error(
        &self,
        user_id: Uuid,
        action: &str,
        resource_type: &str,
        resource_id: &str,
        error: &str,
        details: JsonValue,
    ) {
        let log = AuditLog::new(user_id, action, resource_type, false)
            .with_resource_id(resource_id)
            .with_error(error)
            .with_details(details);
        self.write_log(log).await;
    }
}
