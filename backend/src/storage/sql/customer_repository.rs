use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::parse_timestamp;
use crate::db::DbConnection;
use crate::domain::models::Customer;
use crate::storage::traits::CustomerStore;

/// SQL-backed customer repository
#[derive(Clone)]
pub struct SqlCustomerRepository {
    db: DbConnection,
}

impl SqlCustomerRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_customer(row: &SqliteRow) -> Result<Customer> {
        Ok(Customer {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            company: row.try_get("company")?,
            created_at: parse_timestamp(row.try_get::<String, _>("created_at")?.as_str())?,
        })
    }
}

#[async_trait]
impl CustomerStore for SqlCustomerRepository {
    async fn insert_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "INSERT INTO customers (id, name, email, phone, address, company, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.company)
        .bind(customer.created_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_customer(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query("SELECT * FROM customers ORDER BY created_at DESC")
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::row_to_customer).collect()
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "UPDATE customers SET name = ?, email = ?, phone = ?, address = ?, company = ?
             WHERE id = ?",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.company)
        .bind(&customer.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_customer(&self, id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn setup_test_repo() -> SqlCustomerRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        SqlCustomerRepository::new(db)
    }

    fn test_customer(name: &str, offset_secs: i64) -> Customer {
        Customer {
            id: Customer::generate_id(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "0771234567".to_string(),
            address: "12 Galle Road, Colombo".to_string(),
            company: None,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn store_and_get_customer() {
        let repo = setup_test_repo().await;
        let customer = test_customer("Amara", 0);

        repo.insert_customer(&customer).await.expect("Failed to insert customer");

        let retrieved = repo
            .get_customer(&customer.id)
            .await
            .expect("Failed to get customer")
            .expect("Customer should exist");
        assert_eq!(retrieved, customer);
    }

    #[tokio::test]
    async fn get_nonexistent_customer() {
        let repo = setup_test_repo().await;
        let result = repo.get_customer("no-such-id").await.expect("Query failed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn list_customers_newest_first() {
        let repo = setup_test_repo().await;
        let older = test_customer("Older", 0);
        let newer = test_customer("Newer", 5);

        repo.insert_customer(&older).await.unwrap();
        repo.insert_customer(&newer).await.unwrap();

        let customers = repo.list_customers().await.expect("Failed to list customers");
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name, "Newer");
        assert_eq!(customers[1].name, "Older");
    }

    #[tokio::test]
    async fn update_customer_fields() {
        let repo = setup_test_repo().await;
        let mut customer = test_customer("Before", 0);
        repo.insert_customer(&customer).await.unwrap();

        customer.name = "After".to_string();
        customer.company = Some("Acme Pty Ltd".to_string());
        repo.update_customer(&customer).await.expect("Failed to update customer");

        let retrieved = repo.get_customer(&customer.id).await.unwrap().unwrap();
        assert_eq!(retrieved.name, "After");
        assert_eq!(retrieved.company.as_deref(), Some("Acme Pty Ltd"));
    }

    #[tokio::test]
    async fn delete_customer_reports_rows_removed() {
        let repo = setup_test_repo().await;
        let customer = test_customer("Doomed", 0);
        repo.insert_customer(&customer).await.unwrap();

        let removed = repo.delete_customer(&customer.id).await.expect("Failed to delete");
        assert_eq!(removed, 1);
        assert!(repo.get_customer(&customer.id).await.unwrap().is_none());

        let removed_again = repo.delete_customer(&customer.id).await.expect("Failed to re-delete");
        assert_eq!(removed_again, 0);
    }
}
