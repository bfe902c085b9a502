use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::parse_timestamp;
use crate::db::DbConnection;
use crate::domain::models::{CompanySettings, SETTINGS_ID};
use crate::storage::traits::SettingsStore;

/// SQL-backed repository for the company settings singleton.
///
/// The row is keyed by the fixed [`SETTINGS_ID`]; the upsert keeps it
/// a singleton no matter how often settings are saved.
#[derive(Clone)]
pub struct SqlSettingsRepository {
    db: DbConnection,
}

impl SqlSettingsRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_settings(row: &SqliteRow) -> Result<CompanySettings> {
        Ok(CompanySettings {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            logo_url: row.try_get("logo_url")?,
            created_at: parse_timestamp(row.try_get::<String, _>("created_at")?.as_str())?,
            updated_at: parse_timestamp(row.try_get::<String, _>("updated_at")?.as_str())?,
        })
    }
}

#[async_trait]
impl SettingsStore for SqlSettingsRepository {
    async fn get_settings(&self) -> Result<Option<CompanySettings>> {
        let row = sqlx::query("SELECT * FROM company_settings WHERE id = ?")
            .bind(SETTINGS_ID)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_settings(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_settings(&self, settings: &CompanySettings) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO company_settings (id, name, address, phone, email, logo_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(SETTINGS_ID)
        .bind(&settings.name)
        .bind(&settings.address)
        .bind(&settings.phone)
        .bind(&settings.email)
        .bind(&settings.logo_url)
        .bind(settings.created_at.to_rfc3339())
        .bind(settings.updated_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
