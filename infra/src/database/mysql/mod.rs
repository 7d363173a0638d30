//! MySQL repository implementations

mod address_repository_impl;
mod audit_repository_impl;
mod profile_repository_impl;
mod verification_repository_impl;

pub use address_repository_impl::MySqlAddressRepository;
pub use audit_repository_impl::MySqlAuditLogRepository;
pub use profile_repository_impl::{profile_upsert_query, MySqlProfileRepository};
pub use verification_repository_impl::{decode_address, encode_address, MySqlVerificationRepository};

use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use uuid::Uuid;

use ekyc_core::errors::DomainError;

/// Read a column, mapping decode failures to `Internal`
pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::internal(format!("Failed to get {}: {}", name, e)))
}

/// Read a CHAR(36) column as a UUID
pub(crate) fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw).map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", name, e)))
}

pub(crate) fn optional_uuid_column(row: &MySqlRow, name: &str) -> Result<Option<Uuid>, DomainError> {
    let raw: Option<String> = column(row, name)?;
    raw.map(|id| Uuid::parse_str(&id))
        .transpose()
        .map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", name, e)))
}

/// Wrap a query failure with the operation that issued it
pub(crate) fn query_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::internal(format!("{}: {}", context, e))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
