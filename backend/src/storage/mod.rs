//! Storage layer: trait definitions, the SQL repositories that
//! implement them, and the file-backed asset store.

pub mod assets;
pub mod sql;
pub mod traits;

pub use assets::AssetStore;
pub use sql::{
    SqlCustomerRepository, SqlProjectRepository, SqlQuotationRepository,
    SqlServiceItemRepository, SqlSettingsRepository,
};
pub use traits::{CustomerStore, ProjectStore, QuotationStore, ServiceItemStore, SettingsStore};
