use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{Currency, ProjectStatus};
use uuid::Uuid;

/// Domain model representing a piece of work quoted to a customer.
///
/// The project's currency is the billing currency for its service
/// items and is copied onto quotations generated from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub status: ProjectStatus,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Generate a unique ID for a project
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}
