use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain model for one billable line of work under a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: String,
    /// Number of units; fractional quantities are allowed
    pub quantity: f64,
    /// Price per unit in the project currency
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl ServiceItem {
    /// Generate a unique ID for a service item
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}
