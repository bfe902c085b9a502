use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{Currency, QuotationStatus};
use uuid::Uuid;

use super::service_item::ServiceItem;

/// One line of a quotation: a snapshot of a service item at the moment
/// it was included. The snapshot stays intact even if the source
/// service item is later edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationLineItem {
    pub service_item_id: String,
    pub name: String,
    pub description: String,
    pub quantity: f64,
    pub price: f64,
}

impl QuotationLineItem {
    /// Snapshot a service item into a quotation line.
    pub fn from_service_item(item: &ServiceItem) -> Self {
        Self {
            service_item_id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Domain model for a quotation issued from a project.
///
/// `subtotal`, `tax` and `total` are derived from `items` and must
/// satisfy subtotal = sum of price x quantity, tax = subtotal x 0.10,
/// total = subtotal + tax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: String,
    pub project_id: String,
    pub customer_id: String,
    pub date: NaiveDate,
    pub valid_until: NaiveDate,
    pub items: Vec<QuotationLineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub notes: String,
    pub terms: String,
    pub status: QuotationStatus,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    /// Generate a unique ID for a quotation
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}
