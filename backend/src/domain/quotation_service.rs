use chrono::{Duration, NaiveDate, Utc};
use log::{info, warn};
use shared::{
    CreateQuotationRequest, ProjectStatus, QuotationStatus, UpdateQuotationRequest,
};

use crate::db::DbConnection;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{Quotation, QuotationLineItem};
use crate::domain::totals::quotation_totals;
use crate::storage::sql::{SqlProjectRepository, SqlQuotationRepository, SqlServiceItemRepository};
use crate::storage::traits::{ProjectStore, QuotationStore, ServiceItemStore};

/// How long a quotation stays valid when the caller gives no expiry.
const DEFAULT_VALIDITY_DAYS: i64 = 30;

const DEFAULT_NOTES: &str =
    "Please review the quotation details above. Let us know if you have any questions.";

const DEFAULT_TERMS: &str = "1. 50% deposit required before work begins.\n\
2. Remaining balance due upon project completion.\n\
3. Revisions limited to two rounds per deliverable.\n\
4. Additional revisions billed at hourly rate.";

/// Service for managing quotations and their status workflow.
#[derive(Clone)]
pub struct QuotationService {
    quotations: SqlQuotationRepository,
    projects: SqlProjectRepository,
    items: SqlServiceItemRepository,
}

impl QuotationService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            quotations: SqlQuotationRepository::new(db.clone()),
            projects: SqlProjectRepository::new(db.clone()),
            items: SqlServiceItemRepository::new(db),
        }
    }

    /// Create a quotation from a project's current service items.
    ///
    /// Snapshots the item set, computes the totals, copies the project
    /// currency, and starts the workflow at `draft`. A project carries
    /// at most one quotation; a second create is rejected outright.
    pub async fn create_quotation(&self, request: CreateQuotationRequest) -> DomainResult<Quotation> {
        info!("Creating quotation for project {}", request.project_id);

        let project = self
            .projects
            .get_project(&request.project_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Project not found: {}", request.project_id))
            })?;

        let existing = self.quotations.list_quotations_by_project(&project.id).await?;
        if !existing.is_empty() {
            return Err(DomainError::conflict(format!(
                "Project {} already has a quotation",
                project.id
            )));
        }

        let items = self.items.list_items_by_project(&project.id).await?;
        if items.is_empty() {
            return Err(DomainError::validation(
                "Cannot create a quotation for a project with no service items",
            ));
        }
        let lines: Vec<QuotationLineItem> =
            items.iter().map(QuotationLineItem::from_service_item).collect();
        let totals = quotation_totals(&lines);

        let date = match request.date {
            Some(value) => parse_quote_date(&value, "date")?,
            None => Utc::now().date_naive(),
        };
        let valid_until = match request.valid_until {
            Some(value) => parse_quote_date(&value, "valid until date")?,
            None => date + Duration::days(DEFAULT_VALIDITY_DAYS),
        };
        if valid_until < date {
            return Err(DomainError::validation(
                "Valid until date cannot be before the quotation date",
            ));
        }

        let quotation = Quotation {
            id: Quotation::generate_id(),
            project_id: project.id.clone(),
            customer_id: project.customer_id.clone(),
            date,
            valid_until,
            items: lines,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            notes: request.notes.unwrap_or_else(|| DEFAULT_NOTES.to_string()),
            terms: request.terms.unwrap_or_else(|| DEFAULT_TERMS.to_string()),
            status: QuotationStatus::Draft,
            currency: project.currency,
            created_at: Utc::now(),
        };

        self.quotations.insert_quotation(&quotation).await?;

        info!(
            "Created quotation {} for project {}: {} items, total {:.2}",
            quotation.id,
            project.id,
            quotation.items.len(),
            quotation.total
        );

        Ok(quotation)
    }

    /// Get a quotation by ID, line items included
    pub async fn get_quotation(&self, id: &str) -> DomainResult<Quotation> {
        let quotation = self.quotations.get_quotation(id).await?;

        quotation.ok_or_else(|| {
            warn!("Quotation not found: {}", id);
            DomainError::not_found(format!("Quotation not found: {}", id))
        })
    }

    /// List all quotations, newest first
    pub async fn list_quotations(&self) -> DomainResult<Vec<Quotation>> {
        Ok(self.quotations.list_quotations().await?)
    }

    /// List the quotations belonging to a project, newest first
    pub async fn list_quotations_by_project(&self, project_id: &str) -> DomainResult<Vec<Quotation>> {
        Ok(self.quotations.list_quotations_by_project(project_id).await?)
    }

    /// List the quotations belonging to a customer, newest first
    pub async fn list_quotations_by_customer(&self, customer_id: &str) -> DomainResult<Vec<Quotation>> {
        Ok(self.quotations.list_quotations_by_customer(customer_id).await?)
    }

    /// Update a quotation's dates, texts, currency or line items.
    ///
    /// When a new item set is supplied, each line is re-snapshotted
    /// from its service item and the totals are recomputed; callers
    /// never write totals directly. Status is not updatable here.
    pub async fn update_quotation(
        &self,
        id: &str,
        request: UpdateQuotationRequest,
    ) -> DomainResult<Quotation> {
        info!("Updating quotation: {}", id);

        let mut quotation = self.get_quotation(id).await?;

        if let Some(date) = request.date {
            quotation.date = parse_quote_date(&date, "date")?;
        }
        if let Some(valid_until) = request.valid_until {
            quotation.valid_until = parse_quote_date(&valid_until, "valid until date")?;
        }
        if quotation.valid_until < quotation.date {
            return Err(DomainError::validation(
                "Valid until date cannot be before the quotation date",
            ));
        }
        if let Some(notes) = request.notes {
            quotation.notes = notes;
        }
        if let Some(terms) = request.terms {
            quotation.terms = terms;
        }
        if let Some(currency) = request.currency {
            quotation.currency = currency;
        }

        let new_items = match request.items {
            Some(payloads) => {
                let mut lines = Vec::with_capacity(payloads.len());
                for payload in payloads {
                    if !payload.quantity.is_finite() || payload.quantity <= 0.0 {
                        return Err(DomainError::validation("Quantity must be greater than zero"));
                    }
                    if !payload.price.is_finite() || payload.price < 0.0 {
                        return Err(DomainError::validation("Price cannot be negative"));
                    }
                    let item = self
                        .items
                        .get_item(&payload.service_item_id)
                        .await?
                        .ok_or_else(|| {
                            DomainError::validation(format!(
                                "Unknown service item in quotation: {}",
                                payload.service_item_id
                            ))
                        })?;
                    lines.push(QuotationLineItem {
                        service_item_id: item.id,
                        name: item.name,
                        description: item.description,
                        quantity: payload.quantity,
                        price: payload.price,
                    });
                }

                let totals = quotation_totals(&lines);
                quotation.subtotal = totals.subtotal;
                quotation.tax = totals.tax;
                quotation.total = totals.total;
                quotation.items = lines.clone();
                Some(lines)
            }
            None => None,
        };

        self.quotations.update_quotation(&quotation).await?;
        if let Some(lines) = new_items {
            self.quotations.replace_items(&quotation.id, &lines).await?;
        }

        info!("Updated quotation: {}", quotation.id);

        Ok(quotation)
    }

    /// Move a quotation through its workflow.
    ///
    /// Allowed: draft -> sent, sent -> accepted | rejected, and the
    /// return path accepted | rejected -> sent. Accepting a quotation
    /// also moves the linked project to in-progress; that push is
    /// one-way and is not undone by a later transition away from
    /// accepted. If the project update fails the quotation keeps its
    /// new status and the failure is only logged.
    pub async fn update_status(&self, id: &str, status: QuotationStatus) -> DomainResult<Quotation> {
        info!("Updating quotation {} status to {}", id, status);

        let mut quotation = self.get_quotation(id).await?;

        if !quotation.status.can_transition_to(status) {
            return Err(DomainError::validation(format!(
                "Cannot move quotation from {} to {}",
                quotation.status, status
            )));
        }

        quotation.status = status;
        self.quotations.update_quotation(&quotation).await?;

        if status == QuotationStatus::Accepted {
            if let Err(e) = self.mark_project_in_progress(&quotation.project_id).await {
                warn!(
                    "Failed to update project {} status after quotation acceptance: {}",
                    quotation.project_id, e
                );
            }
        }

        info!("Quotation {} is now {}", quotation.id, quotation.status);

        Ok(quotation)
    }

    /// Delete a quotation and its line items
    pub async fn delete_quotation(&self, id: &str) -> DomainResult<()> {
        info!("Deleting quotation: {}", id);

        self.get_quotation(id).await?;
        self.quotations.delete_quotation(id).await?;

        info!("Deleted quotation: {}", id);

        Ok(())
    }

    async fn mark_project_in_progress(&self, project_id: &str) -> anyhow::Result<()> {
        let mut project = self
            .projects
            .get_project(project_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Project not found: {}", project_id))?;

        project.status = ProjectStatus::InProgress;
        self.projects.update_project(&project).await?;

        info!("Project {} status updated to in-progress", project_id);
        Ok(())
    }
}

fn parse_quote_date(value: &str, field: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("Invalid {}: {}. Use YYYY-MM-DD.", field, value)))
}
