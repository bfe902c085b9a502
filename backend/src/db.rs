use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

/// DbConnection manages access to the relational store.
///
/// The store does not cascade deletes; referential cleanup across the
/// tables below is the domain services' responsibility.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Connect to the store, creating the database and schema if needed.
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Create a uniquely-named in-memory database for a test.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required tables.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                address TEXT NOT NULL,
                company TEXT,
                created_at TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                customer_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                start_date TEXT NOT NULL,
                status TEXT NOT NULL,
                currency TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS service_items (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                quantity REAL NOT NULL,
                price REAL NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS quotations (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                customer_id TEXT NOT NULL,
                date TEXT NOT NULL,
                valid_until TEXT NOT NULL,
                subtotal REAL NOT NULL,
                tax REAL NOT NULL,
                total REAL NOT NULL,
                notes TEXT NOT NULL,
                terms TEXT NOT NULL,
                status TEXT NOT NULL,
                currency TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
            // Snapshot of the service items a quotation was built from.
            r#"
            CREATE TABLE IF NOT EXISTS quotation_items (
                quotation_id TEXT NOT NULL,
                service_item_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                quantity REAL NOT NULL,
                price REAL NOT NULL
            );
            "#,
            // Singleton row keyed by a fixed id.
            r#"
            CREATE TABLE IF NOT EXISTS company_settings (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                phone TEXT NOT NULL,
                email TEXT NOT NULL,
                logo_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(pool).await?;
        }

        Ok(())
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn schema_setup_creates_all_tables() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(db.pool())
            .await
            .expect("Failed to list tables");
        let tables: Vec<String> = rows.iter().map(|row| row.get("name")).collect();

        for expected in [
            "customers",
            "projects",
            "service_items",
            "quotations",
            "quotation_items",
            "company_settings",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn schema_setup_is_idempotent() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        DbConnection::setup_schema(db.pool()).await.expect("Re-running schema setup failed");
    }
}
