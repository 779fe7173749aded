use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use services::services::seo_scoring::{self, RecalculateSummary};

use crate::{AppState, error::ApiError};

/// POST /scores/recalculate
/// Re-score every active record
pub async fn recalculate_scores(
    State(state): State<AppState>,
) -> Result<ResponseJson<RecalculateSummary>, ApiError> {
    let summary = seo_scoring::recalculate_all(&state.db.pool).await?;
    Ok(ResponseJson(summary))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/scores/recalculate", post(recalculate_scores))
}
