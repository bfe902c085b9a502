use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{parse_timestamp, placeholders};
use crate::db::DbConnection;
use crate::domain::models::ServiceItem;
use crate::storage::traits::ServiceItemStore;

/// SQL-backed service item repository
#[derive(Clone)]
pub struct SqlServiceItemRepository {
    db: DbConnection,
}

impl SqlServiceItemRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_item(row: &SqliteRow) -> Result<ServiceItem> {
        Ok(ServiceItem {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
            created_at: parse_timestamp(row.try_get::<String, _>("created_at")?.as_str())?,
        })
    }
}

#[async_trait]
impl ServiceItemStore for SqlServiceItemRepository {
    async fn insert_item(&self, item: &ServiceItem) -> Result<()> {
        sqlx::query(
            "INSERT INTO service_items (id, project_id, name, description, quantity, price, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&item.project_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.created_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_item(&self, id: &str) -> Result<Option<ServiceItem>> {
        let row = sqlx::query("SELECT * FROM service_items WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_item(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_items(&self) -> Result<Vec<ServiceItem>> {
        let rows = sqlx::query("SELECT * FROM service_items ORDER BY created_at DESC")
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn list_items_by_project(&self, project_id: &str) -> Result<Vec<ServiceItem>> {
        let rows =
            sqlx::query("SELECT * FROM service_items WHERE project_id = ? ORDER BY created_at DESC")
                .bind(project_id)
                .fetch_all(self.db.pool())
                .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn update_item(&self, item: &ServiceItem) -> Result<()> {
        sqlx::query(
            "UPDATE service_items SET name = ?, description = ?, quantity = ?, price = ?
             WHERE id = ?",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.price)
        .bind(&item.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM service_items WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_items_by_projects(&self, project_ids: &[String]) -> Result<u64> {
        if project_ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM service_items WHERE project_id IN ({})",
            placeholders(project_ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in project_ids {
            query = query.bind(id);
        }
        let result = query.execute(self.db.pool()).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn setup_test_repo() -> SqlServiceItemRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        SqlServiceItemRepository::new(db)
    }

    fn test_item(project_id: &str, name: &str, price: f64, offset_secs: i64) -> ServiceItem {
        ServiceItem {
            id: ServiceItem::generate_id(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            description: "Design work".to_string(),
            quantity: 2.0,
            price,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn store_and_get_item() {
        let repo = setup_test_repo().await;
        let item = test_item("project-1", "Logo design", 150.0, 0);

        repo.insert_item(&item).await.expect("Failed to insert item");

        let retrieved = repo
            .get_item(&item.id)
            .await
            .expect("Failed to get item")
            .expect("Item should exist");
        assert_eq!(retrieved, item);
    }

    #[tokio::test]
    async fn list_items_by_project_filters_and_orders() {
        let repo = setup_test_repo().await;
        repo.insert_item(&test_item("project-1", "First", 10.0, 0)).await.unwrap();
        repo.insert_item(&test_item("project-1", "Second", 20.0, 5)).await.unwrap();
        repo.insert_item(&test_item("project-2", "Other", 30.0, 10)).await.unwrap();

        let items = repo.list_items_by_project("project-1").await.expect("Failed to list items");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Second");
        assert_eq!(items[1].name, "First");
    }

    #[tokio::test]
    async fn update_item_quantity_and_price() {
        let repo = setup_test_repo().await;
        let mut item = test_item("project-1", "Hosting", 25.0, 0);
        repo.insert_item(&item).await.unwrap();

        item.quantity = 12.0;
        item.price = 30.0;
        repo.update_item(&item).await.expect("Failed to update item");

        let retrieved = repo.get_item(&item.id).await.unwrap().unwrap();
        assert_eq!(retrieved.quantity, 12.0);
        assert_eq!(retrieved.price, 30.0);
    }

    #[tokio::test]
    async fn delete_item_reports_presence() {
        let repo = setup_test_repo().await;
        let item = test_item("project-1", "Doomed", 10.0, 0);
        repo.insert_item(&item).await.unwrap();

        assert!(repo.delete_item(&item.id).await.expect("Failed to delete"));
        assert!(!repo.delete_item(&item.id).await.expect("Failed to re-delete"));
    }

    #[tokio::test]
    async fn delete_items_across_projects() {
        let repo = setup_test_repo().await;
        repo.insert_item(&test_item("project-1", "A", 10.0, 0)).await.unwrap();
        repo.insert_item(&test_item("project-1", "B", 10.0, 1)).await.unwrap();
        repo.insert_item(&test_item("project-2", "C", 10.0, 2)).await.unwrap();
        repo.insert_item(&test_item("project-3", "Kept", 10.0, 3)).await.unwrap();

        let removed = repo
            .delete_items_by_projects(&["project-1".to_string(), "project-2".to_string()])
            .await
            .expect("Failed to bulk delete");
        assert_eq!(removed, 3);

        let remaining = repo.list_items().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Kept");
    }
}
