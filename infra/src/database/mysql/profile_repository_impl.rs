//! MySQL implementation of the ProfileUpdater port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use uuid::Uuid;

use ekyc_core::domain::entities::{ProfileUpdate, UserProfile};
use ekyc_core::errors::{DomainError, DomainResult};
use ekyc_core::services::kyc::ProfileUpdater;

use super::{column, optional_uuid_column, query_error, uuid_column};

pub struct MySqlProfileRepository {
    pool: MySqlPool,
}

impl MySqlProfileRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: &MySqlRow) -> Result<UserProfile, DomainError> {
        Ok(UserProfile {
            user_id: uuid_column(row, "user_id")?,
            full_name: column(row, "full_name")?,
            is_validated: column(row, "is_validated")?,
            kyc_verified: column(row, "kyc_verified")?,
            kyc_verified_at: column(row, "kyc_verified_at")?,
            kyc_status: column(row, "kyc_status")?,
            photo_url: column(row, "photo_url")?,
            address_id: optional_uuid_column(row, "address_id")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

/// Upsert writing only the `Some` fields of `update`, or `None` when there is nothing to write.
///
/// Re-applying the same update leaves the row unchanged apart from `updated_at`.
pub fn profile_upsert_query(
    user_id: Uuid,
    update: &ProfileUpdate,
    now: DateTime<Utc>,
) -> Option<QueryBuilder<'static, MySql>> {
    if update.is_empty() {
        return None;
    }

    let mut columns = vec!["user_id", "updated_at"];
    if update.is_validated.is_some() {
        columns.push("is_validated");
    }
    if update.kyc_verified.is_some() {
        columns.push("kyc_verified");
    }
    if update.kyc_verified_at.is_some() {
        columns.push("kyc_verified_at");
    }
    if update.kyc_status.is_some() {
        columns.push("kyc_status");
    }
    if update.full_name.is_some() {
        columns.push("full_name");
    }
    if update.photo_url.is_some() {
        columns.push("photo_url");
    }
    if update.address_id.is_some() {
        columns.push("address_id");
    }

    let mut builder = QueryBuilder::new("INSERT INTO user_profiles (");
    builder.push(columns.join(", "));
    builder.push(") VALUES (");
    {
        // Bind order must follow `columns`
        let mut values = builder.separated(", ");
        values.push_bind(user_id.to_string());
        values.push_bind(now);
        if let Some(is_validated) = update.is_validated {
            values.push_bind(is_validated);
        }
        if let Some(kyc_verified) = update.kyc_verified {
            values.push_bind(kyc_verified);
        }
        if let Some(verified_at) = update.kyc_verified_at {
            values.push_bind(verified_at);
        }
        if let Some(status) = update.kyc_status {
            values.push_bind(status.as_str());
        }
        if let Some(full_name) = &update.full_name {
            values.push_bind(full_name.clone());
        }
        if let Some(photo_url) = &update.photo_url {
            values.push_bind(photo_url.clone());
        }
        if let Some(address_id) = update.address_id {
            values.push_bind(address_id.to_string());
        }
    }
    builder.push(") ON DUPLICATE KEY UPDATE ");
    builder.push(
        columns[1..]
            .iter()
            .map(|name| format!("{0} = VALUES({0})", name))
            .collect::<Vec<_>>()
            .join(", "),
    );

    Some(builder)
}

#[async_trait]
impl ProfileUpdater for MySqlProfileRepository {
    async fn apply_update(&self, user_id: Uuid, update: &ProfileUpdate) -> DomainResult<()> {
        let Some(mut builder) = profile_upsert_query(user_id, update, Utc::now()) else {
            return Ok(());
        };

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to update user profile"))?;

        tracing::debug!(user_id = %user_id, "User profile updated");
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> DomainResult<UserProfile> {
        let query = r#"
            SELECT user_id, full_name, is_validated, kyc_verified, kyc_verified_at,
                   kyc_status, photo_url, address_id, updated_at
            FROM user_profiles
            WHERE user_id = ?
        "#;

        let row = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to get user profile"))?;

        match row {
            Some(row) => Self::row_to_profile(&row),
            None => Err(DomainError::not_found("user profile")),
        }
    }
}
