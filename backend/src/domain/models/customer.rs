use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain model representing a customer quotations are issued to.
///
/// Customers own projects; deleting a customer takes its projects,
/// their service items and their quotations with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Generate a unique ID for a customer
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}
