use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Fire-and-forget audit destination used by the verification flow.
///
/// Implementations must never fail or hold up the caller; write errors are
/// theirs to log.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_user_action(
        &self,
        user_id: Uuid,
        action: &str,
        resource_type: &str,
        resource_id: &str,
        details: JsonValue,
    );

    async fn log_user_action_with_error(
        &self,
        user_id: Uuid,
        action: &str,
        resource_type: &str,
        resource_id: &str,
        error: &str,
        details: JsonValue,
    );
}
