use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use shared::{CreateProjectRequest, ProjectStatus, UpdateProjectRequest};

use crate::db::DbConnection;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::Project;
use crate::storage::sql::{
    SqlCustomerRepository, SqlProjectRepository, SqlQuotationRepository, SqlServiceItemRepository,
};
use crate::storage::traits::{CustomerStore, ProjectStore, QuotationStore, ServiceItemStore};

/// Service for managing projects.
#[derive(Clone)]
pub struct ProjectService {
    projects: SqlProjectRepository,
    customers: SqlCustomerRepository,
    items: SqlServiceItemRepository,
    quotations: SqlQuotationRepository,
}

impl ProjectService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            projects: SqlProjectRepository::new(db.clone()),
            customers: SqlCustomerRepository::new(db.clone()),
            items: SqlServiceItemRepository::new(db.clone()),
            quotations: SqlQuotationRepository::new(db),
        }
    }

    /// Create a new project under an existing customer
    pub async fn create_project(&self, request: CreateProjectRequest) -> DomainResult<Project> {
        info!("Creating project: {} for customer {}", request.name, request.customer_id);

        validate_name(&request.name)?;
        let start_date = parse_start_date(&request.start_date)?;

        // The owning customer must exist before anything is written
        if self.customers.get_customer(&request.customer_id).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Customer not found: {}",
                request.customer_id
            )));
        }

        let project = Project {
            id: Project::generate_id(),
            customer_id: request.customer_id,
            name: request.name.trim().to_string(),
            description: request.description.trim().to_string(),
            start_date,
            status: request.status.unwrap_or(ProjectStatus::Pending),
            currency: request.currency,
            created_at: Utc::now(),
        };

        self.projects.insert_project(&project).await?;

        info!("Created project: {} with ID: {}", project.name, project.id);

        Ok(project)
    }

    /// Get a project by ID
    pub async fn get_project(&self, id: &str) -> DomainResult<Project> {
        let project = self.projects.get_project(id).await?;

        project.ok_or_else(|| {
            warn!("Project not found: {}", id);
            DomainError::not_found(format!("Project not found: {}", id))
        })
    }

    /// List all projects, newest first
    pub async fn list_projects(&self) -> DomainResult<Vec<Project>> {
        let projects = self.projects.list_projects().await?;
        info!("Found {} projects", projects.len());
        Ok(projects)
    }

    /// List the projects belonging to a customer, newest first
    pub async fn list_projects_by_customer(&self, customer_id: &str) -> DomainResult<Vec<Project>> {
        let projects = self.projects.list_projects_by_customer(customer_id).await?;
        info!("Found {} projects for customer {}", projects.len(), customer_id);
        Ok(projects)
    }

    /// Update an existing project
    pub async fn update_project(
        &self,
        id: &str,
        request: UpdateProjectRequest,
    ) -> DomainResult<Project> {
        info!("Updating project: {}", id);

        let mut project = self.get_project(id).await?;

        if let Some(name) = request.name {
            validate_name(&name)?;
            project.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            project.description = description.trim().to_string();
        }
        if let Some(start_date) = request.start_date {
            project.start_date = parse_start_date(&start_date)?;
        }
        if let Some(status) = request.status {
            project.status = status;
        }
        if let Some(currency) = request.currency {
            project.currency = currency;
        }

        self.projects.update_project(&project).await?;

        info!("Updated project: {} with ID: {}", project.name, project.id);

        Ok(project)
    }

    /// Delete a project together with its service items and quotations.
    ///
    /// Same straight-line, non-compensating sequence as the customer
    /// cascade, scoped to a single project.
    pub async fn delete_project(&self, id: &str) -> DomainResult<()> {
        info!("Starting project delete for: {}", id);

        let project = self.get_project(id).await?;
        let project_ids = [id.to_string()];

        let items_removed = self.items.delete_items_by_projects(&project_ids).await?;
        info!("Deleted {} service items", items_removed);

        let quotations_removed = self.quotations.delete_quotations_by_projects(&project_ids).await?;
        info!("Deleted {} quotations", quotations_removed);

        let removed = self.projects.delete_project(id).await?;
        if removed == 0 {
            return Err(DomainError::Store(anyhow!("No project row was deleted: {}", id)));
        }

        info!("Deleted project: {} with ID: {}", project.name, id);

        Ok(())
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Project name cannot be empty"));
    }
    if name.len() > 200 {
        return Err(DomainError::validation("Project name cannot exceed 200 characters"));
    }
    Ok(())
}

fn parse_start_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("Invalid start date: {}. Use YYYY-MM-DD.", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CreateCustomerRequest, Currency, QuotationStatus};

    use crate::domain::customer_service::CustomerService;
    use crate::domain::models::{Quotation, QuotationLineItem, ServiceItem};

    async fn setup_test() -> (ProjectService, CustomerService, DbConnection) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        (ProjectService::new(db.clone()), CustomerService::new(db.clone()), db)
    }

    async fn seed_customer(customers: &CustomerService) -> String {
        customers
            .create_customer(CreateCustomerRequest {
                name: "Amara".to_string(),
                email: "amara@example.com".to_string(),
                phone: "0771234567".to_string(),
                address: "12 Galle Road".to_string(),
                company: None,
            })
            .await
            .unwrap()
            .id
    }

    fn create_request(customer_id: &str, name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            customer_id: customer_id.to_string(),
            name: name.to_string(),
            description: "Build and host the site".to_string(),
            start_date: "2025-03-01".to_string(),
            status: None,
            currency: Currency::Usd,
        }
    }

    #[tokio::test]
    async fn create_project_defaults_to_pending() {
        let (projects, customers, _db) = setup_test().await;
        let customer_id = seed_customer(&customers).await;

        let project = projects.create_project(create_request(&customer_id, "Website")).await.unwrap();
        assert_eq!(project.status, ProjectStatus::Pending);
        assert_eq!(project.start_date.to_string(), "2025-03-01");
        assert_eq!(project.currency, Currency::Usd);
    }

    #[tokio::test]
    async fn create_project_requires_existing_customer() {
        let (projects, _customers, _db) = setup_test().await;
        let result = projects.create_project(create_request("no-such-customer", "Website")).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_project_validation() {
        let (projects, customers, _db) = setup_test().await;
        let customer_id = seed_customer(&customers).await;

        let mut empty_name = create_request(&customer_id, " ");
        empty_name.name = " ".to_string();
        assert!(matches!(
            projects.create_project(empty_name).await,
            Err(DomainError::Validation(_))
        ));

        let mut bad_date = create_request(&customer_id, "Website");
        bad_date.start_date = "01/03/2025".to_string();
        assert!(matches!(
            projects.create_project(bad_date).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn list_projects_by_customer() {
        let (projects, customers, _db) = setup_test().await;
        let first_customer = seed_customer(&customers).await;
        let second_customer = customers
            .create_customer(CreateCustomerRequest {
                name: "Nuwan".to_string(),
                email: "nuwan@example.com".to_string(),
                phone: "0777654321".to_string(),
                address: "34 Kandy Road".to_string(),
                company: None,
            })
            .await
            .unwrap()
            .id;

        projects.create_project(create_request(&first_customer, "One")).await.unwrap();
        projects.create_project(create_request(&first_customer, "Two")).await.unwrap();
        projects.create_project(create_request(&second_customer, "Other")).await.unwrap();

        let listed = projects.list_projects_by_customer(&first_customer).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|p| p.customer_id == first_customer));
    }

    #[tokio::test]
    async fn update_project_status() {
        let (projects, customers, _db) = setup_test().await;
        let customer_id = seed_customer(&customers).await;
        let project = projects.create_project(create_request(&customer_id, "Website")).await.unwrap();

        let updated = projects
            .update_project(
                &project.id,
                UpdateProjectRequest {
                    status: Some(ProjectStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, ProjectStatus::Completed);
        assert_eq!(updated.name, project.name);
    }

    #[tokio::test]
    async fn delete_project_with_no_dependents_removes_only_the_project() {
        let (projects, customers, _db) = setup_test().await;
        let customer_id = seed_customer(&customers).await;
        let project = projects.create_project(create_request(&customer_id, "Website")).await.unwrap();

        projects.delete_project(&project.id).await.unwrap();

        assert!(matches!(
            projects.get_project(&project.id).await,
            Err(DomainError::NotFound(_))
        ));
        // The owning customer is untouched
        assert!(customers.get_customer(&customer_id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_project_cascades_to_items_and_quotations() {
        let (projects, customers, db) = setup_test().await;
        let customer_id = seed_customer(&customers).await;
        let project = projects.create_project(create_request(&customer_id, "Website")).await.unwrap();

        let item_repo = SqlServiceItemRepository::new(db.clone());
        let item = ServiceItem {
            id: ServiceItem::generate_id(),
            project_id: project.id.clone(),
            name: "Design".to_string(),
            description: "Landing page".to_string(),
            quantity: 1.0,
            price: 100.0,
            created_at: Utc::now(),
        };
        item_repo.insert_item(&item).await.unwrap();

        let quotation_repo = SqlQuotationRepository::new(db.clone());
        let quotation = Quotation {
            id: Quotation::generate_id(),
            project_id: project.id.clone(),
            customer_id: customer_id.clone(),
            date: project.start_date,
            valid_until: project.start_date,
            items: vec![QuotationLineItem::from_service_item(&item)],
            subtotal: 100.0,
            tax: 10.0,
            total: 110.0,
            notes: String::new(),
            terms: String::new(),
            status: QuotationStatus::Draft,
            currency: Currency::Usd,
            created_at: Utc::now(),
        };
        quotation_repo.insert_quotation(&quotation).await.unwrap();

        projects.delete_project(&project.id).await.unwrap();

        assert!(item_repo.get_item(&item.id).await.unwrap().is_none());
        assert!(quotation_repo.get_quotation(&quotation.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_nonexistent_project_is_not_found() {
        let (projects, _customers, _db) = setup_test().await;
        assert!(matches!(
            projects.delete_project("no-such-id").await,
            Err(DomainError::NotFound(_))
        ));
    }
}
