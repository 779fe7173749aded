use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::sitemap::{SitemapConfig, SitemapEntry, UpdateSitemapConfig};
use services::services::sitemap::{self, GeneratedSitemap};
use tracing::info;

use crate::{AppState, error::ApiError, extract::Json};

/// GET /sitemap
pub async fn get_sitemap(
    State(state): State<AppState>,
) -> Result<ResponseJson<SitemapConfig>, ApiError> {
    Ok(ResponseJson(SitemapConfig::load(&state.db.pool).await?))
}

/// PUT /sitemap
/// Replace the sitemap entry list
pub async fn update_sitemap(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSitemapConfig>,
) -> Result<ResponseJson<SitemapConfig>, ApiError> {
    let mut entries = payload.entries;
    sitemap::validate_entries(&mut entries)?;
    let config = SitemapConfig::save_entries(&state.db.pool, &entries).await?;
    info!(entries = config.entries.len(), "Saved sitemap entries");
    Ok(ResponseJson(config))
}

/// POST /sitemap/generate
pub async fn generate_sitemap(
    State(state): State<AppState>,
) -> Result<ResponseJson<GeneratedSitemap>, ApiError> {
    let generated = sitemap::regenerate(&state.db.pool, state.generator.site()).await?;
    Ok(ResponseJson(generated))
}

/// POST /sitemap/discover
/// Active pages that have metadata but no sitemap entry
pub async fn discover_sitemap(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<SitemapEntry>>, ApiError> {
    Ok(ResponseJson(sitemap::discover_missing(&state.db.pool).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/sitemap",
        Router::new()
            .route("/", get(get_sitemap).put(update_sitemap))
            .route("/generate", post(generate_sitemap))
            .route("/discover", post(discover_sitemap)),
    )
}
