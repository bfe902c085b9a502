use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{
    CreateCustomerRequest, CreateProjectRequest, CreateQuotationRequest, CreateServiceItemRequest,
    LogoUploadResponse, SaveSettingsRequest, UpdateCustomerRequest, UpdateProjectRequest,
    UpdateQuotationRequest, UpdateQuotationStatusRequest, UpdateServiceItemRequest,
};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::{
    CustomerService, DomainError, ProjectService, QuotationService, ServiceItemService,
    SettingsService,
};
use crate::storage::assets::AssetStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub customers: CustomerService,
    pub projects: ProjectService,
    pub items: ServiceItemService,
    pub quotations: QuotationService,
    pub settings: SettingsService,
}

impl AppState {
    /// Wire up every domain service over one store connection
    pub fn new(db: DbConnection, assets: AssetStore) -> Self {
        Self {
            customers: CustomerService::new(db.clone()),
            projects: ProjectService::new(db.clone()),
            items: ServiceItemService::new(db.clone()),
            quotations: QuotationService::new(db.clone()),
            settings: SettingsService::new(db, assets),
        }
    }
}

/// Map a domain error onto the HTTP status it deserves.
fn error_response(err: DomainError) -> Response {
    match &err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
        DomainError::Conflict(_) => (StatusCode::CONFLICT, err.to_string()).into_response(),
        DomainError::Store(inner) => {
            tracing::error!("Store failure: {:?}", inner);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal storage error".to_string()).into_response()
        }
    }
}

// ---- Customers ----

pub async fn list_customers(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/customers");
    match state.customers.list_customers().await {
        Ok(customers) => (StatusCode::OK, Json(customers)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> impl IntoResponse {
    info!("POST /api/customers - name: {}", request.name);
    match state.customers.create_customer(request).await {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/customers/{}", id);
    match state.customers.get_customer(&id).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCustomerRequest>,
) -> impl IntoResponse {
    info!("PUT /api/customers/{}", id);
    match state.customers.update_customer(&id, request).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/customers/{}", id);
    match state.customers.delete_customer(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn list_customer_projects(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/customers/{}/projects", id);
    match state.projects.list_projects_by_customer(&id).await {
        Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn list_customer_quotations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/customers/{}/quotations", id);
    match state.quotations.list_quotations_by_customer(&id).await {
        Ok(quotations) => (StatusCode::OK, Json(quotations)).into_response(),
        Err(e) => error_response(e),
    }
}

// ---- Projects ----

pub async fn list_projects(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/projects");
    match state.projects.list_projects().await {
        Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    info!("POST /api/projects - name: {}", request.name);
    match state.projects.create_project(request).await {
        Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/projects/{}", id);
    match state.projects.get_project(&id).await {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    info!("PUT /api/projects/{}", id);
    match state.projects.update_project(&id, request).await {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/projects/{}", id);
    match state.projects.delete_project(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn list_project_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/projects/{}/items", id);
    match state.items.list_items_by_project(&id).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn list_project_quotations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/projects/{}/quotations", id);
    match state.quotations.list_quotations_by_project(&id).await {
        Ok(quotations) => (StatusCode::OK, Json(quotations)).into_response(),
        Err(e) => error_response(e),
    }
}

// ---- Service items ----

pub async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/items");
    match state.items.list_items().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateServiceItemRequest>,
) -> impl IntoResponse {
    info!("POST /api/items - name: {}", request.name);
    match state.items.create_item(request).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/items/{}", id);
    match state.items.get_item(&id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateServiceItemRequest>,
) -> impl IntoResponse {
    info!("PUT /api/items/{}", id);
    match state.items.update_item(&id, request).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/items/{}", id);
    match state.items.delete_item(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

// ---- Quotations ----

pub async fn list_quotations(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/quotations");
    match state.quotations.list_quotations().await {
        Ok(quotations) => (StatusCode::OK, Json(quotations)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_quotation(
    State(state): State<AppState>,
    Json(request): Json<CreateQuotationRequest>,
) -> impl IntoResponse {
    info!("POST /api/quotations - project: {}", request.project_id);
    match state.quotations.create_quotation(request).await {
        Ok(quotation) => (StatusCode::CREATED, Json(quotation)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/quotations/{}", id);
    match state.quotations.get_quotation(&id).await {
        Ok(quotation) => (StatusCode::OK, Json(quotation)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuotationRequest>,
) -> impl IntoResponse {
    info!("PUT /api/quotations/{}", id);
    match state.quotations.update_quotation(&id, request).await {
        Ok(quotation) => (StatusCode::OK, Json(quotation)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_quotation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuotationStatusRequest>,
) -> impl IntoResponse {
    info!("PUT /api/quotations/{}/status - {}", id, request.status);
    match state.quotations.update_status(&id, request.status).await {
        Ok(quotation) => (StatusCode::OK, Json(quotation)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/quotations/{}", id);
    match state.quotations.delete_quotation(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

// ---- Company settings ----

pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/settings");
    match state.settings.get_settings().await {
        // Serializes to null until the settings are first saved
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn save_settings(
    State(state): State<AppState>,
    Json(request): Json<SaveSettingsRequest>,
) -> impl IntoResponse {
    info!("PUT /api/settings");
    match state.settings.save_settings(request).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn upload_logo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    info!("POST /api/settings/logo");

    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("file") {
                    let file_name = field.file_name().unwrap_or("logo").to_string();
                    match field.bytes().await {
                        Ok(data) => upload = Some((file_name, data.to_vec())),
                        Err(e) => {
                            return (StatusCode::BAD_REQUEST, format!("Failed to read upload: {}", e))
                                .into_response()
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, format!("Malformed multipart request: {}", e))
                    .into_response()
            }
        }
    }

    let Some((file_name, bytes)) = upload else {
        return (StatusCode::BAD_REQUEST, "Missing 'file' upload field".to_string()).into_response();
    };

    match state.settings.upload_logo(&bytes, &file_name).await {
        Ok(logo_url) => (StatusCode::CREATED, Json(LogoUploadResponse { logo_url })).into_response(),
        Err(e) => error_response(e),
    }
}
