//! Audit log repository trait defining the interface for audit log persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainError;

/// Repository trait for AuditLog persistence
///
/// Writes are expected to be cheap; the audit service decides whether they run
/// inline or on a background task.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Persist a new audit entry
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError>;

    /// Most recent entries for a user, newest first
    async fn find_by_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<AuditLog>, DomainError>;
}
