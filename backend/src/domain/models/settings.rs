use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed identifier of the single company settings row.
pub const SETTINGS_ID: &str = "company-settings";

/// The issuing company's details, printed on every quotation.
///
/// A process-wide singleton: at most one row ever exists, keyed by
/// [`SETTINGS_ID`], created lazily on first save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySettings {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
