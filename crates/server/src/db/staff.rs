//! Staff account repository.
//!
//! Admin, shipper, and storage accounts share a shape (email, password hash,
//! stored refresh token) but live in separate tables so a leaked buyer
//! credential can never cross into a staff table. One repository covers all
//! three; the table is picked by a closed enum, never by caller input.

use sqlx::PgPool;

use clementine_core::{AccountRole, Email};

use super::RepositoryError;
use crate::models::StaffAccount;

/// The staff table a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffTable {
    Admin,
    Shipper,
    Storage,
}

impl StaffTable {
    const fn table_name(self) -> &'static str {
        match self {
            Self::Admin => "admin_account",
            Self::Shipper => "shipper_account",
            Self::Storage => "storage_account",
        }
    }

    /// The JWT role claim minted for accounts in this table.
    #[must_use]
    pub const fn role(self) -> AccountRole {
        match self {
            Self::Admin => AccountRole::Admin,
            Self::Shipper => AccountRole::Shipper,
            Self::Storage => AccountRole::Storage,
        }
    }
}

/// Repository for staff account operations.
pub struct StaffRepository<'a> {
    pool: &'a PgPool,
    table: StaffTable,
}

impl<'a> StaffRepository<'a> {
    /// Create a repository bound to one staff table.
    #[must_use]
    pub const fn new(pool: &'a PgPool, table: StaffTable) -> Self {
        Self { pool, table }
    }

    /// Create a staff account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        display_name: &str,
    ) -> Result<StaffAccount, RepositoryError> {
        let account = sqlx::query_as::<_, StaffAccount>(&format!(
            "INSERT INTO {} (email, password_hash, display_name)
             VALUES ($1, $2, $3)
             RETURNING id, email, display_name, created_at",
            self.table.table_name()
        ))
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        Ok(account)
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<StaffAccount>, RepositoryError> {
        let account = sqlx::query_as::<_, StaffAccount>(&format!(
            "SELECT id, email, display_name, created_at FROM {} WHERE id = $1",
            self.table.table_name()
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(account)
    }

    /// Get an account and its password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(StaffAccount, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, (i64, String)>(&format!(
            "SELECT id, password_hash FROM {} WHERE email = $1",
            self.table.table_name()
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some((id, password_hash)) = row else {
            return Ok(None);
        };

        let account = self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)?;

        Ok(Some((account, password_hash)))
    }

    /// Store the refresh token on the account row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    pub async fn set_refresh_token(
        &self,
        id: i64,
        refresh_token: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET refresh_token = $2 WHERE id = $1",
            self.table.table_name()
        ))
        .bind(id)
        .bind(refresh_token)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Clear the stored refresh token (logout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_refresh_token(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            "UPDATE {} SET refresh_token = NULL WHERE id = $1",
            self.table.table_name()
        ))
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get the stored refresh token for exact-match validation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    pub async fn get_refresh_token(&self, id: i64) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query_as::<_, (Option<String>,)>(&format!(
            "SELECT refresh_token FROM {} WHERE id = $1",
            self.table.table_name()
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_are_fixed() {
        assert_eq!(StaffTable::Admin.table_name(), "admin_account");
        assert_eq!(StaffTable::Shipper.table_name(), "shipper_account");
        assert_eq!(StaffTable::Storage.table_name(), "storage_account");
    }

    #[test]
    fn test_table_role_mapping() {
        assert_eq!(StaffTable::Admin.role(), AccountRole::Admin);
        assert_eq!(StaffTable::Shipper.role(), AccountRole::Shipper);
        assert_eq!(StaffTable::Storage.role(), AccountRole::Storage);
    }
}
