use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::robots::{RobotsConfig, RobotsHistoryEntry, UpdateRobotsConfig};
use serde::Deserialize;
use services::services::robots::{self, RobotsFile};
use tracing::info;

use crate::{
    AppState,
    error::ApiError,
    extract::{Json, Query},
};

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// GET /robots
pub async fn get_robots(
    State(state): State<AppState>,
) -> Result<ResponseJson<RobotsFile>, ApiError> {
    let file = robots::load_or_default(&state.db.pool, &state.generator.site().site_url).await?;
    Ok(ResponseJson(file))
}

/// PUT /robots
/// Replace robots.txt; the previous content is archived to history
pub async fn update_robots(
    State(state): State<AppState>,
    Json(payload): Json<UpdateRobotsConfig>,
) -> Result<ResponseJson<RobotsFile>, ApiError> {
    robots::validate(&payload.content)?;
    let config = RobotsConfig::replace(&state.db.pool, &payload).await?;
    info!(
        updated_by = ?config.updated_by,
        bytes = config.content.len(),
        "Replaced robots.txt"
    );
    Ok(ResponseJson(config.into()))
}

/// GET /robots/history?limit=
pub async fn robots_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<ResponseJson<Vec<RobotsHistoryEntry>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let entries = RobotsHistoryEntry::find_recent(&state.db.pool, limit).await?;
    Ok(ResponseJson(entries))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/robots",
        Router::new()
            .route("/", get(get_robots).put(update_robots))
            .route("/history", get(robots_history)),
    )
}
