//! Runs the validator over stored records and caches the outcome.
//!
//! The cached `seo_score` on a record is only as fresh as its `scored_at`;
//! callers that need the current score should run [`validate`] themselves.

use db::models::seo_metadata::{SeoMetadata, SeoMetadataFilter};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use ts_rs::TS;

use super::seo_validation::{SeoValidationInput, ValidationResult, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct RecalculateSummary {
    pub updated: usize,
    /// Mean of the new scores, absent when there was nothing to score
    pub average_score: Option<f64>,
}

/// Validate one record and store the score, issues and warnings on it
pub async fn score_and_store(
    pool: &SqlitePool,
    record: &SeoMetadata,
) -> Result<ValidationResult, sqlx::Error> {
    let result = validate(&SeoValidationInput::from(record));
    SeoMetadata::update_score(pool, record.id, result.score, &result.issues, &result.warnings)
        .await?;

    if record.seo_score.is_some_and(|cached| cached != result.score) {
        warn!(
            page_path = %record.page_path,
            cached = ?record.seo_score,
            score = result.score,
            "Cached SEO score was stale"
        );
    }
    info!(
        page_path = %record.page_path,
        score = result.score,
        grade = %result.grade,
        "Scored SEO metadata"
    );
    Ok(result)
}

/// Re-score every active record
pub async fn recalculate_all(pool: &SqlitePool) -> Result<RecalculateSummary, sqlx::Error> {
    let records = SeoMetadata::find_all(
        pool,
        &SeoMetadataFilter {
            page_type: None,
            active: Some(true),
        },
    )
    .await?;

    let mut total: i64 = 0;
    for record in &records {
        let result = score_and_store(pool, record).await?;
        total += i64::from(result.score);
    }

    let updated = records.len();
    let average_score = (updated > 0).then(|| {
        let mean = total as f64 / updated as f64;
        (mean * 10.0).round() / 10.0
    });
    info!(updated, average_score = ?average_score, "Recalculated SEO scores");

    Ok(RecalculateSummary {
        updated,
        average_score,
    })
}
