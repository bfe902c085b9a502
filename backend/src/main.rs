use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, Level};

mod config;
mod db;
mod domain;
mod rest;
mod storage;

use config::Config;
use db::DbConnection;
use rest::AppState;
use storage::assets::AssetStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    // Both connection parameters are required; bail out before
    // touching anything else if they are missing.
    let config = Config::from_env()?;

    info!("Setting up store at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    std::fs::create_dir_all(&config.data_dir)?;
    let assets = AssetStore::new(config.data_dir.clone(), config.public_base_url.clone());

    let state = AppState::new(db, assets);

    // CORS setup to allow the front end to make requests
    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/customers", get(rest::list_customers).post(rest::create_customer))
        .route(
            "/customers/:id",
            get(rest::get_customer).put(rest::update_customer).delete(rest::delete_customer),
        )
        .route("/customers/:id/projects", get(rest::list_customer_projects))
        .route("/customers/:id/quotations", get(rest::list_customer_quotations))
        .route("/projects", get(rest::list_projects).post(rest::create_project))
        .route(
            "/projects/:id",
            get(rest::get_project).put(rest::update_project).delete(rest::delete_project),
        )
        .route("/projects/:id/items", get(rest::list_project_items))
        .route("/projects/:id/quotations", get(rest::list_project_quotations))
        .route("/items", get(rest::list_items).post(rest::create_item))
        .route(
            "/items/:id",
            get(rest::get_item).put(rest::update_item).delete(rest::delete_item),
        )
        .route("/quotations", get(rest::list_quotations).post(rest::create_quotation))
        .route(
            "/quotations/:id",
            get(rest::get_quotation).put(rest::update_quotation).delete(rest::delete_quotation),
        )
        .route("/quotations/:id/status", put(rest::update_quotation_status))
        .route("/settings", get(rest::get_settings).put(rest::save_settings))
        .route("/settings/logo", post(rest::upload_logo));

    let app = Router::new()
        .nest("/api", api_routes)
        .nest_service("/assets", ServeDir::new(&config.data_dir))
        .layer(cors)
        .with_state(state);

    info!("Starting server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
