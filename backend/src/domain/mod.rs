//! Domain layer: entity models, the total-aggregation rules, and one
//! service per entity type. Services own validation, the cascade
//! sequences, and the quotation workflow; storage details stay behind
//! the repositories they hold.

pub mod customer_service;
pub mod error;
pub mod models;
pub mod project_service;
pub mod quotation_service;
pub mod service_item_service;
pub mod settings_service;
pub mod totals;

pub use customer_service::CustomerService;
pub use error::{DomainError, DomainResult};
pub use project_service::ProjectService;
pub use quotation_service::QuotationService;
pub use service_item_service::ServiceItemService;
pub use settings_service::SettingsService;
