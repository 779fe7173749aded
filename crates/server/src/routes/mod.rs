use axum::Router;

use crate::AppState;

pub mod metadata;
pub mod robots;
pub mod scores;
pub mod sitemap;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(metadata::router())
        .merge(robots::router())
        .merge(sitemap::router())
        .merge(scores::router())
}
