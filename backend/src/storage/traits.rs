//! # Storage Traits
//!
//! This module defines the storage abstraction traits that keep the
//! domain layer independent of the concrete store implementation.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{
    CompanySettings, Customer, Project, Quotation, QuotationLineItem, ServiceItem,
};

/// Trait defining the interface for customer storage operations
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Store a new customer
    async fn insert_customer(&self, customer: &Customer) -> Result<()>;

    /// Retrieve a specific customer by ID
    async fn get_customer(&self, id: &str) -> Result<Option<Customer>>;

    /// List all customers, newest first
    async fn list_customers(&self) -> Result<Vec<Customer>>;

    /// Update an existing customer
    async fn update_customer(&self, customer: &Customer) -> Result<()>;

    /// Delete a customer by ID
    /// Returns the number of rows actually removed
    async fn delete_customer(&self, id: &str) -> Result<u64>;
}

/// Trait defining the interface for project storage operations
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Store a new project
    async fn insert_project(&self, project: &Project) -> Result<()>;

    /// Retrieve a specific project by ID
    async fn get_project(&self, id: &str) -> Result<Option<Project>>;

    /// List all projects, newest first
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// List the projects belonging to a customer, newest first
    async fn list_projects_by_customer(&self, customer_id: &str) -> Result<Vec<Project>>;

    /// Update an existing project
    async fn update_project(&self, project: &Project) -> Result<()>;

    /// Delete a project by ID
    /// Returns the number of rows actually removed
    async fn delete_project(&self, id: &str) -> Result<u64>;

    /// Delete several projects at once (customer cascade)
    /// Returns the number of rows actually removed
    async fn delete_projects(&self, ids: &[String]) -> Result<u64>;
}

/// Trait defining the interface for service item storage operations
#[async_trait]
pub trait ServiceItemStore: Send + Sync {
    /// Store a new service item
    async fn insert_item(&self, item: &ServiceItem) -> Result<()>;

    /// Retrieve a specific service item by ID
    async fn get_item(&self, id: &str) -> Result<Option<ServiceItem>>;

    /// List all service items, newest first
    async fn list_items(&self) -> Result<Vec<ServiceItem>>;

    /// List the service items belonging to a project, newest first
    async fn list_items_by_project(&self, project_id: &str) -> Result<Vec<ServiceItem>>;

    /// Update an existing service item
    async fn update_item(&self, item: &ServiceItem) -> Result<()>;

    /// Delete a service item by ID
    /// Returns true if the item was found and deleted, false otherwise
    async fn delete_item(&self, id: &str) -> Result<bool>;

    /// Delete every service item belonging to the given projects (cascade)
    /// Returns the number of rows actually removed
    async fn delete_items_by_projects(&self, project_ids: &[String]) -> Result<u64>;
}

/// Trait defining the interface for quotation storage operations
///
/// Quotations span two tables: the quotation row and its line-item
/// snapshot rows. The multi-step writes below are independent requests,
/// not one transaction; callers own the partial-failure policy.
#[async_trait]
pub trait QuotationStore: Send + Sync {
    /// Store a new quotation together with its line items
    async fn insert_quotation(&self, quotation: &Quotation) -> Result<()>;

    /// Retrieve a specific quotation, line items included
    async fn get_quotation(&self, id: &str) -> Result<Option<Quotation>>;

    /// List all quotations, newest first
    async fn list_quotations(&self) -> Result<Vec<Quotation>>;

    /// List the quotations belonging to a project, newest first
    async fn list_quotations_by_project(&self, project_id: &str) -> Result<Vec<Quotation>>;

    /// List the quotations belonging to a customer, newest first
    async fn list_quotations_by_customer(&self, customer_id: &str) -> Result<Vec<Quotation>>;

    /// Update a quotation's scalar fields (not its line items)
    async fn update_quotation(&self, quotation: &Quotation) -> Result<()>;

    /// Replace a quotation's line-item set
    async fn replace_items(&self, quotation_id: &str, items: &[QuotationLineItem]) -> Result<()>;

    /// Delete a quotation and its line items by ID
    /// Returns true if the quotation was found and deleted, false otherwise
    async fn delete_quotation(&self, id: &str) -> Result<bool>;

    /// Delete every quotation (and line items) belonging to the given
    /// projects (cascade)
    /// Returns the number of quotation rows actually removed
    async fn delete_quotations_by_projects(&self, project_ids: &[String]) -> Result<u64>;
}

/// Trait defining the interface for the company settings singleton
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Retrieve the settings row, if it has ever been saved
    async fn get_settings(&self) -> Result<Option<CompanySettings>>;

    /// Insert or update the settings row under its fixed ID
    async fn upsert_settings(&self, settings: &CompanySettings) -> Result<()>;
}
