use anyhow::Result;
use chrono::Utc;
use log::{debug, info, warn};
use shared::{CreateServiceItemRequest, UpdateServiceItemRequest};

use crate::db::DbConnection;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{QuotationLineItem, ServiceItem};
use crate::domain::totals::quotation_totals;
use crate::storage::sql::{SqlProjectRepository, SqlQuotationRepository, SqlServiceItemRepository};
use crate::storage::traits::{ProjectStore, QuotationStore, ServiceItemStore};

/// Service for managing the billable service items under a project.
///
/// Every item mutation re-syncs the project's quotation (if one
/// exists): the item set is re-snapshotted and the derived totals are
/// recomputed and persisted. Items are the source of truth; the
/// quotation's totals are a best-effort derived cache, so a failed
/// sync is logged without rolling back the item mutation.
#[derive(Clone)]
pub struct ServiceItemService {
    items: SqlServiceItemRepository,
    projects: SqlProjectRepository,
    quotations: SqlQuotationRepository,
}

impl ServiceItemService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            items: SqlServiceItemRepository::new(db.clone()),
            projects: SqlProjectRepository::new(db.clone()),
            quotations: SqlQuotationRepository::new(db),
        }
    }

    /// Create a new service item under an existing project
    pub async fn create_item(&self, request: CreateServiceItemRequest) -> DomainResult<ServiceItem> {
        info!("Creating service item: {} for project {}", request.name, request.project_id);

        validate_fields(&request.name, request.quantity, request.price)?;

        if self.projects.get_project(&request.project_id).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Project not found: {}",
                request.project_id
            )));
        }

        let item = ServiceItem {
            id: ServiceItem::generate_id(),
            project_id: request.project_id,
            name: request.name.trim().to_string(),
            description: request.description.trim().to_string(),
            quantity: request.quantity,
            price: request.price,
            created_at: Utc::now(),
        };

        self.items.insert_item(&item).await?;

        info!("Created service item: {} with ID: {}", item.name, item.id);

        self.sync_project_quotation(&item.project_id).await;

        Ok(item)
    }

    /// Get a service item by ID
    pub async fn get_item(&self, id: &str) -> DomainResult<ServiceItem> {
        let item = self.items.get_item(id).await?;

        item.ok_or_else(|| {
            warn!("Service item not found: {}", id);
            DomainError::not_found(format!("Service item not found: {}", id))
        })
    }

    /// List all service items, newest first
    pub async fn list_items(&self) -> DomainResult<Vec<ServiceItem>> {
        Ok(self.items.list_items().await?)
    }

    /// List the service items belonging to a project, newest first
    pub async fn list_items_by_project(&self, project_id: &str) -> DomainResult<Vec<ServiceItem>> {
        let items = self.items.list_items_by_project(project_id).await?;
        info!("Found {} service items for project {}", items.len(), project_id);
        Ok(items)
    }

    /// Update an existing service item
    pub async fn update_item(
        &self,
        id: &str,
        request: UpdateServiceItemRequest,
    ) -> DomainResult<ServiceItem> {
        info!("Updating service item: {}", id);

        let mut item = self.get_item(id).await?;

        if let Some(name) = request.name {
            item.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            item.description = description.trim().to_string();
        }
        if let Some(quantity) = request.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = request.price {
            item.price = price;
        }
        validate_fields(&item.name, item.quantity, item.price)?;

        self.items.update_item(&item).await?;

        info!("Updated service item: {} with ID: {}", item.name, item.id);

        self.sync_project_quotation(&item.project_id).await;

        Ok(item)
    }

    /// Delete a service item
    pub async fn delete_item(&self, id: &str) -> DomainResult<()> {
        info!("Deleting service item: {}", id);

        let item = self.get_item(id).await?;

        self.items.delete_item(id).await?;

        info!("Deleted service item: {} with ID: {}", item.name, id);

        self.sync_project_quotation(&item.project_id).await;

        Ok(())
    }

    /// Push the project's current item set onto its quotation, if any.
    ///
    /// Failures are logged, not propagated: the triggering item
    /// mutation already happened and stands either way.
    async fn sync_project_quotation(&self, project_id: &str) {
        if let Err(e) = self.try_sync_quotation(project_id).await {
            warn!("Failed to sync quotation totals for project {}: {}", project_id, e);
        }
    }

    async fn try_sync_quotation(&self, project_id: &str) -> Result<()> {
        // At most one quotation per project; take the newest if older
        // data predates that rule.
        let Some(mut quotation) = self
            .quotations
            .list_quotations_by_project(project_id)
            .await?
            .into_iter()
            .next()
        else {
            debug!("No quotation linked to project {}, nothing to sync", project_id);
            return Ok(());
        };

        let items = self.items.list_items_by_project(project_id).await?;
        let lines: Vec<QuotationLineItem> =
            items.iter().map(QuotationLineItem::from_service_item).collect();
        let totals = quotation_totals(&lines);

        quotation.subtotal = totals.subtotal;
        quotation.tax = totals.tax;
        quotation.total = totals.total;

        self.quotations.update_quotation(&quotation).await?;
        self.quotations.replace_items(&quotation.id, &lines).await?;

        info!(
            "Synced quotation {} for project {}: {} items, total {:.2}",
            quotation.id,
            project_id,
            lines.len(),
            totals.total
        );

        Ok(())
    }
}

fn validate_fields(name: &str, quantity: f64, price: f64) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Service item name cannot be empty"));
    }
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(DomainError::validation("Quantity must be greater than zero"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("Price cannot be negative"));
    }
    Ok(())
}
