use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{parse_date, parse_timestamp, placeholders};
use crate::db::DbConnection;
use crate::domain::models::{Quotation, QuotationLineItem};
use crate::storage::traits::QuotationStore;

/// SQL-backed quotation repository.
///
/// A quotation is a `quotations` row plus its `quotation_items`
/// snapshot rows. The writes that touch both tables are sequential
/// independent requests; the row is written first so a failed item
/// write never leaves items without their quotation.
#[derive(Clone)]
pub struct SqlQuotationRepository {
    db: DbConnection,
}

impl SqlQuotationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_quotation(row: &SqliteRow, items: Vec<QuotationLineItem>) -> Result<Quotation> {
        Ok(Quotation {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            customer_id: row.try_get("customer_id")?,
            date: parse_date(row.try_get::<String, _>("date")?.as_str())?,
            valid_until: parse_date(row.try_get::<String, _>("valid_until")?.as_str())?,
            items,
            subtotal: row.try_get("subtotal")?,
            tax: row.try_get("tax")?,
            total: row.try_get("total")?,
            notes: row.try_get("notes")?,
            terms: row.try_get("terms")?,
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

    async fn load_items(&self, quotation_id: &str) -> Result<Vec<QuotationLineItem>> {
        let rows = sqlx::query(
            "SELECT service_item_id, name, description, quantity, price
             FROM quotation_items WHERE quotation_id = ?",
        )
        .bind(quotation_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(QuotationLineItem {
                    service_item_id: row.try_get("service_item_id")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    quantity: row.try_get("quantity")?,
                    price: row.try_get("price")?,
                })
            })
            .collect()
    }

    async fn insert_items(&self, quotation_id: &str, items: &[QuotationLineItem]) -> Result<()> {
        for item in items {
            sqlx::query(
                "INSERT INTO quotation_items (quotation_id, service_item_id, name, description, quantity, price)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(quotation_id)
            .bind(&item.service_item_id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.price)
            .execute(self.db.pool())
            .await?;
        }
        Ok(())
    }

    async fn assemble(&self, rows: Vec<SqliteRow>) -> Result<Vec<Quotation>> {
        let mut quotations = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id")?;
            let items = self.load_items(&id).await?;
            quotations.push(Self::row_to_quotation(row, items)?);
        }
        Ok(quotations)
    }
}

#[async_trait]
impl QuotationStore for SqlQuotationRepository {
    async fn insert_quotation(&self, quotation: &Quotation) -> Result<()> {
        sqlx::query(
            "INSERT INTO quotations (id, project_id, customer_id, date, valid_until, subtotal, tax, total, notes, terms, status, currency, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&quotation.id)
        .bind(&quotation.project_id)
        .bind(&quotation.customer_id)
        .bind(quotation.date.format("%Y-%m-%d").to_string())
        .bind(quotation.valid_until.format("%Y-%m-%d").to_string())
        .bind(quotation.subtotal)
        .bind(quotation.tax)
        .bind(quotation.total)
        .bind(&quotation.notes)
        .bind(&quotation.terms)
        .bind(quotation.status.as_str())
        .bind(quotation.currency.as_str())
        .bind(quotation.created_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;

        self.insert_items(&quotation.id, &quotation.items).await
    }

    async fn get_quotation(&self, id: &str) -> Result<Option<Quotation>> {
        let row = sqlx::query("SELECT * FROM quotations WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => {
                let items = self.load_items(id).await?;
                Ok(Some(Self::row_to_quotation(&row, items)?))
            }
            None => Ok(None),
        }
    }

    async fn list_quotations(&self) -> Result<Vec<Quotation>> {
        let rows = sqlx::query("SELECT * FROM quotations ORDER BY created_at DESC")
            .fetch_all(self.db.pool())
            .await?;
        self.assemble(rows).await
    }

    async fn list_quotations_by_project(&self, project_id: &str) -> Result<Vec<Quotation>> {
        let rows = sqlx::query("SELECT * FROM quotations WHERE project_id = ? ORDER BY created_at DESC")
            .bind(project_id)
            .fetch_all(self.db.pool())
            .await?;
        self.assemble(rows).await
    }

    async fn list_quotations_by_customer(&self, customer_id: &str) -> Result<Vec<Quotation>> {
        let rows = sqlx::query("SELECT * FROM quotations WHERE customer_id = ? ORDER BY created_at DESC")
            .bind(customer_id)
            .fetch_all(self.db.pool())
            .await?;
        self.assemble(rows).await
    }

    async fn update_quotation(&self, quotation: &Quotation) -> Result<()> {
        sqlx::query(
            "UPDATE quotations SET project_id = ?, customer_id = ?, date = ?, valid_until = ?, subtotal = ?, tax = ?, total = ?, notes = ?, terms = ?, status = ?, currency = ?
             WHERE id = ?",
        )
        .bind(&quotation.project_id)
        .bind(&quotation.customer_id)
        .bind(quotation.date.format("%Y-%m-%d").to_string())
        .bind(quotation.valid_until.format("%Y-%m-%d").to_string())
        .bind(quotation.subtotal)
        .bind(quotation.tax)
        .bind(quotation.total)
        .bind(&quotation.notes)
        .bind(&quotation.terms)
        .bind(quotation.status.as_str())
        .bind(quotation.currency.as_str())
        .bind(&quotation.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn replace_items(&self, quotation_id: &str, items: &[QuotationLineItem]) -> Result<()> {
        sqlx::query("DELETE FROM quotation_items WHERE quotation_id = ?")
            .bind(quotation_id)
            .execute(self.db.pool())
            .await?;

        self.insert_items(quotation_id, items).await
    }

    async fn delete_quotation(&self, id: &str) -> Result<bool> {
        sqlx::query("DELETE FROM quotation_items WHERE quotation_id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        let result = sqlx::query("DELETE FROM quotations WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_quotations_by_projects(&self, project_ids: &[String]) -> Result<u64> {
        if project_ids.is_empty() {
            return Ok(0);
        }

        let marks = placeholders(project_ids.len());

        let items_sql = format!(
            "DELETE FROM quotation_items WHERE quotation_id IN
             (SELECT id FROM quotations WHERE project_id IN ({}))",
            marks
        );
        let mut items_query = sqlx::query(&items_sql);
        for id in project_ids {
            items_query = items_query.bind(id);
        }
        items_query.execute(self.db.pool()).await?;

        let sql = format!("DELETE FROM quotations WHERE project_id IN ({})", marks);
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
    use chrono::{Duration, NaiveDate, Utc};
    use shared::{Currency, QuotationStatus};

    async fn setup_test_repo() -> SqlQuotationRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        SqlQuotationRepository::new(db)
    }

    fn line(service_item_id: &str, price: f64, quantity: f64) -> QuotationLineItem {
        QuotationLineItem {
            service_item_id: service_item_id.to_string(),
            name: "Design".to_string(),
            description: "Landing page design".to_string(),
            quantity,
            price,
        }
    }

    fn test_quotation(project_id: &str, items: Vec<QuotationLineItem>, offset_secs: i64) -> Quotation {
        let subtotal: f64 = items.iter().map(|i| i.price * i.quantity).sum();
        Quotation {
            id: Quotation::generate_id(),
            project_id: project_id.to_string(),
            customer_id: "customer-1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            items,
            subtotal,
            tax: subtotal * 0.10,
            total: subtotal * 1.10,
            notes: "Thanks for your business.".to_string(),
            terms: "50% deposit.".to_string(),
            status: QuotationStatus::Draft,
            currency: Currency::Usd,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn store_and_get_quotation_with_items() {
        let repo = setup_test_repo().await;
        let quotation = test_quotation("project-1", vec![line("item-1", 100.0, 2.0)], 0);

        repo.insert_quotation(&quotation).await.expect("Failed to insert quotation");

        let retrieved = repo
            .get_quotation(&quotation.id)
            .await
            .expect("Failed to get quotation")
            .expect("Quotation should exist");
        assert_eq!(retrieved, quotation);
        assert_eq!(retrieved.items.len(), 1);
        assert_eq!(retrieved.items[0].service_item_id, "item-1");
    }

    #[tokio::test]
    async fn list_by_project_newest_first() {
        let repo = setup_test_repo().await;
        let older = test_quotation("project-1", vec![line("item-1", 10.0, 1.0)], 0);
        let newer = test_quotation("project-1", vec![line("item-2", 20.0, 1.0)], 5);
        let other = test_quotation("project-2", vec![line("item-3", 30.0, 1.0)], 10);
        repo.insert_quotation(&older).await.unwrap();
        repo.insert_quotation(&newer).await.unwrap();
        repo.insert_quotation(&other).await.unwrap();

        let quotations = repo
            .list_quotations_by_project("project-1")
            .await
            .expect("Failed to list quotations");
        assert_eq!(quotations.len(), 2);
        assert_eq!(quotations[0].id, newer.id);
        assert_eq!(quotations[1].id, older.id);
    }

    #[tokio::test]
    async fn replace_items_rewrites_the_set() {
        let repo = setup_test_repo().await;
        let quotation = test_quotation("project-1", vec![line("item-1", 100.0, 2.0)], 0);
        repo.insert_quotation(&quotation).await.unwrap();

        let new_items = vec![line("item-2", 50.0, 1.0), line("item-3", 25.0, 4.0)];
        repo.replace_items(&quotation.id, &new_items).await.expect("Failed to replace items");

        let retrieved = repo.get_quotation(&quotation.id).await.unwrap().unwrap();
        assert_eq!(retrieved.items.len(), 2);
        assert!(retrieved.items.iter().all(|i| i.service_item_id != "item-1"));
    }

    #[tokio::test]
    async fn update_quotation_scalars() {
        let repo = setup_test_repo().await;
        let mut quotation = test_quotation("project-1", vec![line("item-1", 100.0, 2.0)], 0);
        repo.insert_quotation(&quotation).await.unwrap();

        quotation.status = QuotationStatus::Sent;
        quotation.subtotal = 250.0;
        quotation.tax = 25.0;
        quotation.total = 275.0;
        repo.update_quotation(&quotation).await.expect("Failed to update quotation");

        let retrieved = repo.get_quotation(&quotation.id).await.unwrap().unwrap();
        assert_eq!(retrieved.status, QuotationStatus::Sent);
        assert_eq!(retrieved.total, 275.0);
    }

    #[tokio::test]
    async fn delete_quotation_removes_items_too() {
        let repo = setup_test_repo().await;
        let quotation = test_quotation("project-1", vec![line("item-1", 100.0, 2.0)], 0);
        repo.insert_quotation(&quotation).await.unwrap();

        assert!(repo.delete_quotation(&quotation.id).await.expect("Failed to delete"));
        assert!(repo.get_quotation(&quotation.id).await.unwrap().is_none());

        let orphans = repo.load_items(&quotation.id).await.unwrap();
        assert!(orphans.is_empty());

        assert!(!repo.delete_quotation(&quotation.id).await.expect("Failed to re-delete"));
    }

    #[tokio::test]
    async fn delete_quotations_across_projects() {
        let repo = setup_test_repo().await;
        let doomed_a = test_quotation("project-1", vec![line("item-1", 10.0, 1.0)], 0);
        let doomed_b = test_quotation("project-2", vec![line("item-2", 20.0, 1.0)], 5);
        let kept = test_quotation("project-3", vec![line("item-3", 30.0, 1.0)], 10);
        repo.insert_quotation(&doomed_a).await.unwrap();
        repo.insert_quotation(&doomed_b).await.unwrap();
        repo.insert_quotation(&kept).await.unwrap();

        let removed = repo
            .delete_quotations_by_projects(&["project-1".to_string(), "project-2".to_string()])
            .await
            .expect("Failed to bulk delete");
        assert_eq!(removed, 2);

        assert!(repo.load_items(&doomed_a.id).await.unwrap().is_empty());
        assert!(repo.load_items(&doomed_b.id).await.unwrap().is_empty());

        let remaining = repo.list_quotations().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
    }
}
