use anyhow::anyhow;
use chrono::Utc;
use log::{info, warn};
use shared::{CreateCustomerRequest, UpdateCustomerRequest};

use crate::db::DbConnection;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::Customer;
use crate::storage::sql::{
    SqlCustomerRepository, SqlProjectRepository, SqlQuotationRepository, SqlServiceItemRepository,
};
use crate::storage::traits::{CustomerStore, ProjectStore, QuotationStore, ServiceItemStore};

/// Service for managing customers.
///
/// Owns the customer cascade: the store does not cascade deletes, so
/// removing a customer walks its projects, their service items and
/// quotations before touching the customer row itself.
#[derive(Clone)]
pub struct CustomerService {
    customers: SqlCustomerRepository,
    projects: SqlProjectRepository,
    items: SqlServiceItemRepository,
    quotations: SqlQuotationRepository,
}

impl CustomerService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            customers: SqlCustomerRepository::new(db.clone()),
            projects: SqlProjectRepository::new(db.clone()),
            items: SqlServiceItemRepository::new(db.clone()),
            quotations: SqlQuotationRepository::new(db),
        }
    }

    /// Create a new customer
    pub async fn create_customer(&self, request: CreateCustomerRequest) -> DomainResult<Customer> {
        info!("Creating customer: {}", request.name);

        validate_name(&request.name)?;
        validate_email(&request.email)?;
        validate_required(&request.phone, "Phone")?;
        validate_required(&request.address, "Address")?;

        let customer = Customer {
            id: Customer::generate_id(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            address: request.address.trim().to_string(),
            company: request.company.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            created_at: Utc::now(),
        };

        self.customers.insert_customer(&customer).await?;

        info!("Created customer: {} with ID: {}", customer.name, customer.id);

        Ok(customer)
    }

    /// Get a customer by ID
    pub async fn get_customer(&self, id: &str) -> DomainResult<Customer> {
        let customer = self.customers.get_customer(id).await?;

        customer.ok_or_else(|| {
            warn!("Customer not found: {}", id);
            DomainError::not_found(format!("Customer not found: {}", id))
        })
    }

    /// List all customers, newest first
    pub async fn list_customers(&self) -> DomainResult<Vec<Customer>> {
        let customers = self.customers.list_customers().await?;
        info!("Found {} customers", customers.len());
        Ok(customers)
    }

    /// Update an existing customer
    pub async fn update_customer(
        &self,
        id: &str,
        request: UpdateCustomerRequest,
    ) -> DomainResult<Customer> {
        info!("Updating customer: {}", id);

        let mut customer = self.get_customer(id).await?;

        if let Some(name) = request.name {
            validate_name(&name)?;
            customer.name = name.trim().to_string();
        }
        if let Some(email) = request.email {
            validate_email(&email)?;
            customer.email = email.trim().to_string();
        }
        if let Some(phone) = request.phone {
            validate_required(&phone, "Phone")?;
            customer.phone = phone.trim().to_string();
        }
        if let Some(address) = request.address {
            validate_required(&address, "Address")?;
            customer.address = address.trim().to_string();
        }
        if let Some(company) = request.company {
            let trimmed = company.trim().to_string();
            customer.company = if trimmed.is_empty() { None } else { Some(trimmed) };
        }

        self.customers.update_customer(&customer).await?;

        info!("Updated customer: {} with ID: {}", customer.name, customer.id);

        Ok(customer)
    }

    /// Delete a customer and everything that hangs off it.
    ///
    /// Straight-line sequence, not a transaction: service items, then
    /// quotations, then projects, then the customer row. A failure
    /// midway propagates and leaves the earlier deletions in place.
    pub async fn delete_customer(&self, id: &str) -> DomainResult<()> {
        info!("Starting customer delete for: {}", id);

        let customer = self.get_customer(id).await?;

        let projects = self.projects.list_projects_by_customer(id).await?;
        let project_ids: Vec<String> = projects.iter().map(|p| p.id.clone()).collect();
        info!("Found {} projects for customer {}", project_ids.len(), id);

        if !project_ids.is_empty() {
            let items_removed = self.items.delete_items_by_projects(&project_ids).await?;
            info!("Deleted {} service items", items_removed);

            let quotations_removed = self.quotations.delete_quotations_by_projects(&project_ids).await?;
            info!("Deleted {} quotations", quotations_removed);

            let projects_removed = self.projects.delete_projects(&project_ids).await?;
            info!("Deleted {} projects", projects_removed);
        }

        let removed = self.customers.delete_customer(id).await?;
        if removed == 0 {
            return Err(DomainError::Store(anyhow!("No customer row was deleted: {}", id)));
        }

        info!("Deleted customer: {} with ID: {}", customer.name, id);

        Ok(())
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Customer name cannot be empty"));
    }
    if name.len() > 200 {
        return Err(DomainError::validation("Customer name cannot exceed 200 characters"));
    }
    Ok(())
}

fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::validation("Email cannot be empty"));
    }
    // Same shape check the submission forms apply: local@domain.tld
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation(format!("Invalid email address: {}", email)));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(char::is_whitespace) {
        return Err(DomainError::validation(format!("Invalid email address: {}", email)));
    }
    Ok(())
}

fn validate_required(value: &str, field: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}
