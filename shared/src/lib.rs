use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProjectStatus::Pending),
            "in-progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            other => Err(format!("Unknown project status: {}", other)),
        }
    }
}

/// Workflow status of a quotation.
///
/// Quotations start as `Draft`, are marked `Sent` when handed to the
/// customer, and end up `Accepted` or `Rejected`. Accepted and rejected
/// quotations can be returned to `Sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "sent")]
    Sent,
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "rejected")]
    Rejected,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Rejected => "rejected",
        }
    }

    /// Whether a manual transition from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: QuotationStatus) -> bool {
        use QuotationStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Sent, Accepted) | (Sent, Rejected) | (Accepted, Sent) | (Rejected, Sent)
        )
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuotationStatus::Draft),
            "sent" => Ok(QuotationStatus::Sent),
            "accepted" => Ok(QuotationStatus::Accepted),
            "rejected" => Ok(QuotationStatus::Rejected),
            other => Err(format!("Unknown quotation status: {}", other)),
        }
    }
}

/// Currencies a project (and its quotations) can be billed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "LKR")]
    Lkr,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "AUD")]
    Aud,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Lkr => "LKR",
            Currency::Usd => "USD",
            Currency::Aud => "AUD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LKR" => Ok(Currency::Lkr),
            "USD" => Ok(Currency::Usd),
            "AUD" => Ok(Currency::Aud),
            other => Err(format!("Unknown currency: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Optional company the contact person belongs to
    pub company: Option<String>,
}

/// Partial update; fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub customer_id: String,
    pub name: String,
    pub description: String,
    /// Start date in `YYYY-MM-DD` format
    pub start_date: String,
    /// Defaults to `pending` when not provided
    pub status: Option<ProjectStatus>,
    pub currency: Currency,
}

/// Partial update; fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Start date in `YYYY-MM-DD` format
    pub start_date: Option<String>,
    pub status: Option<ProjectStatus>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceItemRequest {
    pub project_id: String,
    pub name: String,
    pub description: String,
    /// Number of units; fractional quantities are allowed
    pub quantity: f64,
    /// Price per unit in the project currency
    pub price: f64,
}

/// Partial update; fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateServiceItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateQuotationRequest {
    pub project_id: String,
    /// Quotation date in `YYYY-MM-DD` format; defaults to today
    pub date: Option<String>,
    /// Expiry date in `YYYY-MM-DD` format; defaults to 30 days after `date`
    pub valid_until: Option<String>,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

/// One line of a quotation as submitted by a caller editing the item set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationItemPayload {
    pub service_item_id: String,
    pub quantity: f64,
    pub price: f64,
}

/// Partial update; fields left as `None` keep their current value.
///
/// Status is deliberately absent here - status changes go through the
/// dedicated status endpoint so the workflow rules apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuotationRequest {
    pub date: Option<String>,
    pub valid_until: Option<String>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub currency: Option<Currency>,
    /// Replaces the whole line-item set when provided; totals are recomputed
    pub items: Option<Vec<QuotationItemPayload>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuotationStatusRequest {
    pub status: QuotationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSettingsRequest {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Public URL of the uploaded logo, if any
    pub logo_url: Option<String>,
}

/// Response for a logo upload: where the stored file can be fetched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoUploadResponse {
    pub logo_url: String,
}
