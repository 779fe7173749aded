use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::seo_metadata::{
    BulkUpdateResponse, BulkUpdateSeoMetadata, CreateSeoMetadata, SeoMetadata, SeoMetadataFilter,
    UpdateSeoMetadata, normalize_page_path,
};
use serde::Deserialize;
use services::services::{
    metadata_generator::PagePreview, seo_scoring, seo_validation::ValidationResult,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extract::{Json, Path, Query},
};

async fn load(state: &AppState, id: Uuid) -> Result<SeoMetadata, ApiError> {
    SeoMetadata::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("SEO metadata {id} not found")))
}

/// GET /metadata?page_type=&active=
pub async fn list_metadata(
    State(state): State<AppState>,
    Query(filter): Query<SeoMetadataFilter>,
) -> Result<ResponseJson<Vec<SeoMetadata>>, ApiError> {
    let records = SeoMetadata::find_all(&state.db.pool, &filter).await?;
    Ok(ResponseJson(records))
}

/// POST /metadata
pub async fn create_metadata(
    State(state): State<AppState>,
    Json(payload): Json<CreateSeoMetadata>,
) -> Result<(StatusCode, ResponseJson<SeoMetadata>), ApiError> {
    let record = SeoMetadata::create(&state.db.pool, Uuid::new_v4(), &payload).await?;
    info!(id = %record.id, page_path = %record.page_path, "Created SEO metadata");
    Ok((StatusCode::CREATED, ResponseJson(record)))
}

/// GET /metadata/{id}
pub async fn get_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<SeoMetadata>, ApiError> {
    Ok(ResponseJson(load(&state, id).await?))
}

/// PUT /metadata/{id}
pub async fn update_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSeoMetadata>,
) -> Result<ResponseJson<SeoMetadata>, ApiError> {
    let record = SeoMetadata::update(&state.db.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("SEO metadata {id} not found")))?;
    info!(id = %id, page_path = %record.page_path, "Updated SEO metadata");
    Ok(ResponseJson(record))
}

/// DELETE /metadata/{id}
pub async fn delete_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if SeoMetadata::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound(format!("SEO metadata {id} not found")));
    }
    info!(id = %id, "Deleted SEO metadata");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /metadata/{id}/score
/// Validate the record and cache the score on it
pub async fn score_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ValidationResult>, ApiError> {
    let record = load(&state, id).await?;
    let result = seo_scoring::score_and_store(&state.db.pool, &record).await?;
    Ok(ResponseJson(result))
}

/// GET /metadata/{id}/preview
/// Rendered page metadata and JSON-LD for the record
pub async fn preview_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<PagePreview>, ApiError> {
    let record = load(&state, id).await?;
    Ok(ResponseJson(state.generator.preview(&record)))
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub path: String,
}

/// GET /metadata/lookup?path=
/// Rendered metadata for an active page, looked up by its path
pub async fn lookup_metadata(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<ResponseJson<PagePreview>, ApiError> {
    let page_path = normalize_page_path(&query.path)?;
    let record = SeoMetadata::find_by_page_path(&state.db.pool, &page_path)
        .await?
        .filter(|record| record.is_active)
        .ok_or_else(|| ApiError::NotFound(format!("SEO metadata for {page_path} not found")))?;
    Ok(ResponseJson(state.generator.preview(&record)))
}

/// PUT /metadata/bulk
/// Apply one partial update to many records
pub async fn bulk_update_metadata(
    State(state): State<AppState>,
    Json(payload): Json<BulkUpdateSeoMetadata>,
) -> Result<ResponseJson<BulkUpdateResponse>, ApiError> {
    if payload.ids.is_empty() {
        return Err(ApiError::BadRequest("ids must not be empty".to_string()));
    }
    let response =
        SeoMetadata::bulk_update(&state.db.pool, &payload.ids, &payload.updates).await?;
    info!(
        updated = response.updated,
        not_found = response.not_found.len(),
        "Bulk updated SEO metadata"
    );
    Ok(ResponseJson(response))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/metadata",
        Router::new()
            .route("/", get(list_metadata).post(create_metadata))
            .route("/bulk", put(bulk_update_metadata))
            .route("/lookup", get(lookup_metadata))
            .route(
                "/{id}",
                get(get_metadata).put(update_metadata).delete(delete_metadata),
            )
            .route("/{id}/score", post(score_metadata))
            .route("/{id}/preview", get(preview_metadata)),
    )
}

#[cfg(test)]
mod tests {
    use db::models::seo_metadata::PageType;

    use super::*;
    use crate::routes::tests::test_state;

    async fn create(state: &AppState, path: &str, page_type: PageType) -> SeoMetadata {
        let (status, ResponseJson(record)) = create_metadata(
            State(state.clone()),
            Json(CreateSeoMetadata {
                page_path: path.to_string(),
                page_type: Some(page_type),
                meta_title: Some("Free AI Paraphrasing Tool".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        record
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let state = test_state().await;
        let record = create(&state, "/tools/paraphraser", PageType::Tool).await;

        let ResponseJson(fetched) = get_metadata(State(state.clone()), Path(record.id))
            .await
            .unwrap();
        assert_eq!(fetched.page_path, "/tools/paraphraser");

        let ResponseJson(updated) = update_metadata(
            State(state.clone()),
            Path(record.id),
            Json(UpdateSeoMetadata {
                meta_description: Some("Rewrite any text in seconds.".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            updated.meta_description.as_deref(),
            Some("Rewrite any text in seconds.")
        );
        assert_eq!(updated.meta_title, record.meta_title);

        let status = delete_metadata(State(state.clone()), Path(record.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_metadata(State(state.clone()), Path(record.id))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_filters_by_page_type() {
        let state = test_state().await;
        create(&state, "/", PageType::Home).await;
        create(&state, "/tools/summarizer", PageType::Tool).await;

        let ResponseJson(tools) = list_metadata(
            State(state.clone()),
            Query(SeoMetadataFilter {
                page_type: Some(PageType::Tool),
                active: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].page_type, PageType::Tool);
    }

    #[tokio::test]
    async fn test_duplicate_path_is_bad_request() {
        let state = test_state().await;
        create(&state, "/about", PageType::About).await;
        let err = create_metadata(
            State(state.clone()),
            Json(CreateSeoMetadata {
                page_path: "/about/".to_string(),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_score_caches_validator_result() {
        let state = test_state().await;
        let record = create(&state, "/tools/grammar", PageType::Tool).await;

        let ResponseJson(result) = score_metadata(State(state.clone()), Path(record.id))
            .await
            .unwrap();
        let ResponseJson(stored) = get_metadata(State(state.clone()), Path(record.id))
            .await
            .unwrap();
        assert_eq!(stored.seo_score, Some(result.score));
        assert!(stored.scored_at.is_some());

        let err = score_metadata(State(state.clone()), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preview_includes_json_ld_script() {
        let state = test_state().await;
        let record = create(&state, "/tools/paraphraser", PageType::Tool).await;

        let ResponseJson(preview) = preview_metadata(State(state.clone()), Path(record.id))
            .await
            .unwrap();
        assert_eq!(preview.metadata.title, "Free AI Paraphrasing Tool | WriteKit");
        let script = preview.json_ld_script.unwrap();
        assert!(script.contains("SoftwareApplication"));
    }

    #[tokio::test]
    async fn test_bulk_update_reports_missing_ids() {
        let state = test_state().await;
        let a = create(&state, "/a", PageType::Landing).await;
        let b = create(&state, "/b", PageType::Landing).await;
        let missing = Uuid::new_v4();

        let ResponseJson(response) = bulk_update_metadata(
            State(state.clone()),
            Json(BulkUpdateSeoMetadata {
                ids: vec![a.id, b.id, missing],
                updates: UpdateSeoMetadata {
                    is_active: Some(false),
                    ..Default::default()
                },
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.updated, 2);
        assert_eq!(response.not_found, vec![missing]);

        let err = bulk_update_metadata(
            State(state.clone()),
            Json(BulkUpdateSeoMetadata {
                ids: vec![],
                updates: UpdateSeoMetadata::default(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_lookup_by_path_normalizes_and_skips_inactive() {
        let state = test_state().await;
        let record = create(&state, "/tools/paraphraser", PageType::Tool).await;

        let ResponseJson(preview) = lookup_metadata(
            State(state.clone()),
            Query(LookupQuery {
                path: "tools/paraphraser/?ref=nav".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(preview.metadata.canonical, "https://writekit.example/tools/paraphraser");

        update_metadata(
            State(state.clone()),
            Path(record.id),
            Json(UpdateSeoMetadata {
                is_active: Some(false),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let err = lookup_metadata(
            State(state.clone()),
            Query(LookupQuery {
                path: "/tools/paraphraser".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = lookup_metadata(
            State(state),
            Query(LookupQuery {
                path: "   ".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
