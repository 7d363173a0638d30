//! MySQL implementation of the AddressResolver port.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use ekyc_core::domain::entities::Address;
use ekyc_core::errors::{DomainError, DomainResult};
use ekyc_core::services::kyc::AddressResolver;

use super::{column, is_unique_violation, query_error, uuid_column};

/// Address book keyed on the normalized full-address text
pub struct MySqlAddressRepository {
    pool: MySqlPool,
}

impl MySqlAddressRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_by_normalized(&self, normalized: &str) -> DomainResult<Option<Uuid>> {
        let row = sqlx::query("SELECT id FROM addresses WHERE normalized_address = ?")
            .bind(normalized)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to look up address"))?;

        row.map(|row| uuid_column(&row, "id")).transpose()
    }

    fn row_to_address(row: &MySqlRow) -> Result<Address, DomainError> {
        Ok(Address {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            house: column(row, "house")?,
            street: column(row, "street")?,
            landmark: column(row, "landmark")?,
            post_office: column(row, "post_office")?,
            subdistrict: column(row, "subdistrict")?,
            district: column(row, "district")?,
            vtc: column(row, "vtc")?,
            state: column(row, "state")?,
            country: column(row, "country")?,
            pincode: column(row, "pincode")?,
            full_address: column(row, "full_address")?,
            created_by: uuid_column(row, "created_by")?,
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl AddressResolver for MySqlAddressRepository {
    async fn find_or_create(&self, candidate: &Address) -> DomainResult<(Uuid, bool)> {
        let normalized = candidate.normalized_key();
        if let Some(id) = self.find_by_normalized(&normalized).await? {
            return Ok((id, false));
        }

        let query = r#"
            INSERT INTO addresses (
                id, user_id, house, street, landmark, post_office, subdistrict,
                district, vtc, state, country, pincode, full_address,
                normalized_address, created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let inserted = sqlx::query(query)
            .bind(candidate.id.to_string())
            .bind(candidate.user_id.to_string())
            .bind(&candidate.house)
            .bind(&candidate.street)
            .bind(&candidate.landmark)
            .bind(&candidate.post_office)
            .bind(&candidate.subdistrict)
            .bind(&candidate.district)
            .bind(&candidate.vtc)
            .bind(&candidate.state)
            .bind(&candidate.country)
            .bind(&candidate.pincode)
            .bind(&candidate.full_address)
            .bind(&normalized)
            .bind(candidate.created_by.to_string())
            .bind(candidate.created_at)
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => Ok((candidate.id, true)),
            // Lost a race with a concurrent insert of the same address
            Err(e) if is_unique_violation(&e) => self
                .find_by_normalized(&normalized)
                .await?
                .map(|id| (id, false))
                .ok_or_else(|| DomainError::internal("address vanished after duplicate insert")),
            Err(e) => Err(DomainError::internal(format!("Failed to create address: {}", e))),
        }
    }

    async fn get_address(&self, address_id: Uuid) -> DomainResult<Address> {
        let query = r#"
            SELECT id, user_id, house, street, landmark, post_office, subdistrict,
                   district, vtc, state, country, pincode, full_address, created_by, created_at
            FROM addresses
            WHERE id = ?
        "#;

        let row = sqlx::query(query)
            .bind(address_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to get address"))?;

        match row {
            Some(row) => Self::row_to_address(&row),
            None => Err(DomainError::not_found("address")),
        }
    }
}
