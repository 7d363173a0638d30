//! MySQL implementation of the AuditLogRepository trait.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::MySqlPool;
use uuid::Uuid;

use ekyc_core::domain::entities::AuditLog;
use ekyc_core::errors::DomainError;
use ekyc_core::repositories::AuditLogRepository;

use super::{column, query_error, uuid_column};

/// Stores audit events in the append-only `audit_logs` table
pub struct MySqlAuditLogRepository {
    pool: MySqlPool,
}

impl MySqlAuditLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_audit_log(row: &sqlx::mysql::MySqlRow) -> Result<AuditLog, DomainError> {
        let details: Option<JsonValue> = column(row, "details")?;
        Ok(AuditLog {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            action: column(row, "action")?,
            resource_type: column(row, "resource_type")?,
            resource_id: column(row, "resource_id")?,
            success: column(row, "success")?,
            error_message: column(row, "error_message")?,
            details: details.unwrap_or(JsonValue::Null),
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl AuditLogRepository for MySqlAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO audit_logs (
                id, user_id, action, resource_type, resource_id,
                success, error_message, details, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let details = serde_json::to_string(&audit_log.details)
            .map_err(|e| DomainError::internal(format!("Failed to serialize details: {}", e)))?;

        sqlx::query(query)
            .bind(audit_log.id.to_string())
            .bind(audit_log.user_id.to_string())
            .bind(&audit_log.action)
            .bind(&audit_log.resource_type)
            .bind(&audit_log.resource_id)
            .bind(audit_log.success)
            .bind(&audit_log.error_message)
            .bind(details)
            .bind(audit_log.created_at)
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to create audit log"))?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<AuditLog>, DomainError> {
        let query = r#"
            SELECT id, user_id, action, resource_type, resource_id,
                   success, error_message, details, created_at
            FROM audit_logs
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to find audit logs by user"))?;

        rows.iter().map(Self::row_to_audit_log).collect()
    }
}
