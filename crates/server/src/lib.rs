use std::sync::Arc;

use axum::Router;
use db::DBService;
use services::services::metadata_generator::MetadataGenerator;
use error::ApiError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

/// Shared handler state. The generator is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub generator: Arc<MetadataGenerator>,
}

impl AppState {
    pub fn new(db: DBService, generator: MetadataGenerator) -> Self {
        Self {
            db,
            generator: Arc::new(generator),
        }
    }
}

/// Full application router with the admin API under `/api/seo`
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/seo", routes::router())
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
