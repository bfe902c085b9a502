use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{parse_date, parse_timestamp, placeholders};
use crate::db::DbConnection;
use crate::domain::models::Project;
use crate::storage::traits::ProjectStore;

/// SQL-backed project repository
#[derive(Clone)]
pub struct SqlProjectRepository {
    db: DbConnection,
}

impl SqlProjectRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_project(row: &SqliteRow) -> Result<Project> {
        Ok(Project {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            start_date: parse_date(row.try_get::<String, _>("start_date")?.as_str())?,
            status: row
                .try_get::<String, _>("status")?
                .parse()
                .map_err(|e: String| anyhow!(e))?,
            currency: row
                .try_get::<String, _>("currency")?
                .parse()
                .map_err(|e: String| anyhow!(e))?,
            created_at: parse_timestamp(row.try_get::<String, _>("created_at")?.as_str())?,
        })
    }
}

#[async_trait]
impl ProjectStore for SqlProjectRepository {
    async fn insert_project(&self, project: &Project) -> Result<()> {
        sqlx::query(
            "INSERT INTO projects (id, customer_id, name, description, start_date, status, currency, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&project.id)
        .bind(&project.customer_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date.format("%Y-%m-%d").to_string())
        .bind(project.status.as_str())
        .bind(project.currency.as_str())
        .bind(project.created_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_project(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query("SELECT * FROM projects ORDER BY created_at DESC")
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::row_to_project).collect()
    }

    async fn list_projects_by_customer(&self, customer_id: &str) -> Result<Vec<Project>> {
        let rows = sqlx::query("SELECT * FROM projects WHERE customer_id = ? ORDER BY created_at DESC")
            .bind(customer_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::row_to_project).collect()
    }

    async fn update_project(&self, project: &Project) -> Result<()> {
        sqlx::query(
            "UPDATE projects SET customer_id = ?, name = ?, description = ?, start_date = ?, status = ?, currency = ?
             WHERE id = ?",
        )
        .bind(&project.customer_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date.format("%Y-%m-%d").to_string())
        .bind(project.status.as_str())
        .bind(project.currency.as_str())
        .bind(&project.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_project(&self, id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_projects(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!("DELETE FROM projects WHERE id IN ({})", placeholders(ids.len()));
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let result = query.execute(self.db.pool()).await?;
        Ok(result.rows_affected())
    }
}
