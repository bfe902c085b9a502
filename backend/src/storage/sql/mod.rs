//! # SQL Storage Module
//!
//! sqlx-backed implementations of the storage traits. Dates live in the
//! store as text: RFC 3339 for timestamps, `YYYY-MM-DD` for plain
//! dates, so `created_at` ordering is plain text ordering.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};

pub mod customer_repository;
pub mod project_repository;
pub mod quotation_repository;
pub mod service_item_repository;
pub mod settings_repository;

pub use customer_repository::SqlCustomerRepository;
pub use project_repository::SqlProjectRepository;
pub use quotation_repository::SqlQuotationRepository;
pub use service_item_repository::SqlServiceItemRepository;
pub use settings_repository::SqlSettingsRepository;

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Failed to parse timestamp '{}': {}", value, e))
}

/// Parse a `YYYY-MM-DD` date column.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", value, e))
}

/// Build a `?, ?, …` placeholder list for a dynamic `IN` clause.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
