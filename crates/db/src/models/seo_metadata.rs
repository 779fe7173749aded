use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SeoMetadataError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid page path: {0:?}")]
    InvalidPagePath(String),
    #[error("metadata already exists for page path {0}")]
    DuplicatePagePath(String),
}

/// Kind of page a metadata record describes. Drives default descriptions and
/// which structured-data builder is used.
#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sqlx(type_name = "page_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PageType {
    Home,
    Tool,
    Article,
    Faq,
    Landing,
    Category,
    Product,
    About,
    Contact,
    #[default]
    Custom,
}

impl PageType {
    pub const ALL: [PageType; 10] = [
        PageType::Home,
        PageType::Tool,
        PageType::Article,
        PageType::Faq,
        PageType::Landing,
        PageType::Category,
        PageType::Product,
        PageType::About,
        PageType::Contact,
        PageType::Custom,
    ];
}

/// `max-image-preview` robots hint
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "image_preview_size", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImagePreviewSize {
    #[sqlx(rename = "none")]
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    Hidden,
    Standard,
    Large,
}

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "twitter_card", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TwitterCardType {
    Summary,
    SummaryLargeImage,
    App,
    Player,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, TS, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

/// A single finding produced by the SEO validator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct SeoIssue {
    #[serde(rename = "type")]
    pub severity: IssueSeverity,
    pub field: String,
    pub message: String,
    pub score_impact: i32,
}

/// SEO metadata for one logical page, keyed by `page_path`.
///
/// `seo_score`, `seo_issues` and `seo_warnings` are a cache of the last
/// validator run and are only refreshed by an explicit score request.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SeoMetadata {
    pub id: Uuid,
    pub page_path: String,
    pub page_type: PageType,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[sqlx(json)]
    pub keywords: Vec<String>,
    pub canonical_url: Option<String>,
    pub robots_index: bool,
    pub robots_follow: bool,
    pub robots_noarchive: bool,
    pub robots_nosnippet: bool,
    pub robots_max_snippet: Option<i32>,
    pub robots_max_image_preview: Option<ImagePreviewSize>,
    pub robots_max_video_preview: Option<i32>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_image_alt: Option<String>,
    pub og_type: Option<String>,
    pub twitter_card: Option<TwitterCardType>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
    pub schema_enabled: bool,
    #[sqlx(json)]
    pub schema_types: BTreeSet<String>,
    #[sqlx(json)]
    pub schema_data: Option<Value>,
    pub seo_score: Option<i32>,
    #[sqlx(json)]
    pub seo_issues: Vec<SeoIssue>,
    #[sqlx(json)]
    pub seo_warnings: Vec<String>,
    pub scored_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// Request body for creating a metadata record
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateSeoMetadata {
    pub page_path: String,
    pub page_type: Option<PageType>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub canonical_url: Option<String>,
    pub robots_index: Option<bool>,
    pub robots_follow: Option<bool>,
    pub robots_noarchive: Option<bool>,
    pub robots_nosnippet: Option<bool>,
    pub robots_max_snippet: Option<i32>,
    pub robots_max_image_preview: Option<ImagePreviewSize>,
    pub robots_max_video_preview: Option<i32>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_image_alt: Option<String>,
    pub og_type: Option<String>,
    pub twitter_card: Option<TwitterCardType>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
    pub schema_enabled: Option<bool>,
    pub schema_types: Option<BTreeSet<String>>,
    pub schema_data: Option<Value>,
    pub is_active: Option<bool>,
    pub created_by: Option<String>,
}

/// Partial update. `None` leaves a field untouched; an empty string clears a
/// nullable text field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateSeoMetadata {
    pub page_path: Option<String>,
    pub page_type: Option<PageType>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub canonical_url: Option<String>,
    pub robots_index: Option<bool>,
    pub robots_follow: Option<bool>,
    pub robots_noarchive: Option<bool>,
    pub robots_nosnippet: Option<bool>,
    pub robots_max_snippet: Option<i32>,
    pub robots_max_image_preview: Option<ImagePreviewSize>,
    pub robots_max_video_preview: Option<i32>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_image_alt: Option<String>,
    pub og_type: Option<String>,
    pub twitter_card: Option<TwitterCardType>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
    pub schema_enabled: Option<bool>,
    pub schema_types: Option<BTreeSet<String>>,
    pub schema_data: Option<Value>,
    pub is_active: Option<bool>,
    pub updated_by: Option<String>,
}

/// Query filter for listing records
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct SeoMetadataFilter {
    pub page_type: Option<PageType>,
    pub active: Option<bool>,
}

/// Request body for `PUT /metadata/bulk`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BulkUpdateSeoMetadata {
    pub ids: Vec<Uuid>,
    pub updates: UpdateSeoMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BulkUpdateResponse {
    pub updated: usize,
    pub not_found: Vec<Uuid>,
}

/// Normalize a page path to `/segment/segment` form: leading slash, no
/// trailing slash (except the root), no query or fragment.
pub fn normalize_page_path(raw: &str) -> Result<String, SeoMetadataError> {
    let trimmed = raw.trim();
    let path = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    if trimmed.is_empty() || path.chars().any(char::is_whitespace) {
        return Err(SeoMetadataError::InvalidPagePath(raw.to_string()));
    }
    if path.is_empty() {
        return Ok("/".to_string());
    }
    if path.starts_with('/') {
        Ok(path.to_string())
    } else {
        Ok(format!("/{path}"))
    }
}

fn set_text(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        let value = value.trim();
        *target = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl UpdateSeoMetadata {
    /// Apply this partial update onto an existing record in memory
    pub fn apply_to(&self, record: &mut SeoMetadata) -> Result<(), SeoMetadataError> {
        if let Some(path) = &self.page_path {
            record.page_path = normalize_page_path(path)?;
        }
        if let Some(page_type) = self.page_type {
            record.page_type = page_type;
        }
        set_text(&mut record.meta_title, &self.meta_title);
        set_text(&mut record.meta_description, &self.meta_description);
        if let Some(keywords) = &self.keywords {
            record.keywords = clean_keywords(keywords);
        }
        set_text(&mut record.canonical_url, &self.canonical_url);
        if let Some(v) = self.robots_index {
            record.robots_index = v;
        }
        if let Some(v) = self.robots_follow {
            record.robots_follow = v;
        }
        if let Some(v) = self.robots_noarchive {
            record.robots_noarchive = v;
        }
        if let Some(v) = self.robots_nosnippet {
            record.robots_nosnippet = v;
        }
        if self.robots_max_snippet.is_some() {
            record.robots_max_snippet = self.robots_max_snippet;
        }
        if self.robots_max_image_preview.is_some() {
            record.robots_max_image_preview = self.robots_max_image_preview;
        }
        if self.robots_max_video_preview.is_some() {
            record.robots_max_video_preview = self.robots_max_video_preview;
        }
        set_text(&mut record.og_title, &self.og_title);
        set_text(&mut record.og_description, &self.og_description);
        set_text(&mut record.og_image, &self.og_image);
        set_text(&mut record.og_image_alt, &self.og_image_alt);
        set_text(&mut record.og_type, &self.og_type);
        if self.twitter_card.is_some() {
            record.twitter_card = self.twitter_card;
        }
        set_text(&mut record.twitter_title, &self.twitter_title);
        set_text(&mut record.twitter_description, &self.twitter_description);
        set_text(&mut record.twitter_image, &self.twitter_image);
        if let Some(v) = self.schema_enabled {
            record.schema_enabled = v;
        }
        if let Some(types) = &self.schema_types {
            record.schema_types = types.clone();
        }
        if let Some(data) = &self.schema_data {
            record.schema_data = if data.is_null() { None } else { Some(data.clone()) };
        }
        if let Some(v) = self.is_active {
            record.is_active = v;
        }
        if self.updated_by.is_some() {
            record.updated_by = self.updated_by.clone();
        }
        Ok(())
    }
}

fn clean_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .collect()
}

fn map_unique_violation(err: sqlx::Error, page_path: &str) -> SeoMetadataError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            SeoMetadataError::DuplicatePagePath(page_path.to_string())
        }
        _ => SeoMetadataError::Database(err),
    }
}

impl SeoMetadata {
    pub async fn find_all(
        pool: &SqlitePool,
        filter: &SeoMetadataFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SeoMetadata>(
            r#"SELECT * FROM seo_metadata
               WHERE ($1 IS NULL OR page_type = $1)
                 AND ($2 IS NULL OR is_active = $2)
               ORDER BY page_path ASC"#,
        )
        .bind(filter.page_type)
        .bind(filter.active)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SeoMetadata>("SELECT * FROM seo_metadata WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_page_path(
        pool: &SqlitePool,
        page_path: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SeoMetadata>("SELECT * FROM seo_metadata WHERE page_path = $1")
            .bind(page_path)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateSeoMetadata,
    ) -> Result<Self, SeoMetadataError> {
        let page_path = normalize_page_path(&data.page_path)?;
        let keywords = clean_keywords(data.keywords.as_deref().unwrap_or_default());
        let schema_types = data.schema_types.clone().unwrap_or_default();
        let schema_data = data.schema_data.clone().filter(|v| !v.is_null());

        sqlx::query(
            r#"INSERT INTO seo_metadata (
                id, page_path, page_type, meta_title, meta_description, keywords, canonical_url,
                robots_index, robots_follow, robots_noarchive, robots_nosnippet,
                robots_max_snippet, robots_max_image_preview, robots_max_video_preview,
                og_title, og_description, og_image, og_image_alt, og_type,
                twitter_card, twitter_title, twitter_description, twitter_image,
                schema_enabled, schema_types, schema_data, is_active, created_by, updated_by
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $28
            )"#,
        )
        .bind(id)
        .bind(&page_path)
        .bind(data.page_type.unwrap_or_default())
        .bind(non_blank(&data.meta_title))
        .bind(non_blank(&data.meta_description))
        .bind(Json(&keywords))
        .bind(non_blank(&data.canonical_url))
        .bind(data.robots_index.unwrap_or(true))
        .bind(data.robots_follow.unwrap_or(true))
        .bind(data.robots_noarchive.unwrap_or(false))
        .bind(data.robots_nosnippet.unwrap_or(false))
        .bind(data.robots_max_snippet)
        .bind(data.robots_max_image_preview)
        .bind(data.robots_max_video_preview)
        .bind(non_blank(&data.og_title))
        .bind(non_blank(&data.og_description))
        .bind(non_blank(&data.og_image))
        .bind(non_blank(&data.og_image_alt))
        .bind(non_blank(&data.og_type))
        .bind(data.twitter_card)
        .bind(non_blank(&data.twitter_title))
        .bind(non_blank(&data.twitter_description))
        .bind(non_blank(&data.twitter_image))
        .bind(data.schema_enabled.unwrap_or(true))
        .bind(Json(&schema_types))
        .bind(Json(&schema_data))
        .bind(data.is_active.unwrap_or(true))
        .bind(&data.created_by)
        .execute(pool)
        .await
        .map_err(|e| map_unique_violation(e, &page_path))?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(SeoMetadataError::Database(sqlx::Error::RowNotFound))
    }

    /// Apply a partial update. Returns `None` when no record has this id.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateSeoMetadata,
    ) -> Result<Option<Self>, SeoMetadataError> {
        let Some(mut record) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        data.apply_to(&mut record)?;
        Self::write(pool, &record).await?;
        Ok(Self::find_by_id(pool, id).await?)
    }

    /// Apply the same partial update to every id in one transaction.
    pub async fn bulk_update(
        pool: &SqlitePool,
        ids: &[Uuid],
        data: &UpdateSeoMetadata,
    ) -> Result<BulkUpdateResponse, SeoMetadataError> {
        let mut tx = pool.begin().await?;
        let mut updated = 0;
        let mut not_found = Vec::new();

        for id in ids {
            let existing = sqlx::query_as::<_, SeoMetadata>("SELECT * FROM seo_metadata WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            let Some(mut record) = existing else {
                not_found.push(*id);
                continue;
            };
            data.apply_to(&mut record)?;
            Self::write(&mut *tx, &record).await?;
            updated += 1;
        }

        tx.commit().await?;
        Ok(BulkUpdateResponse { updated, not_found })
    }

    async fn write<'e, E>(executor: E, record: &SeoMetadata) -> Result<(), SeoMetadataError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"UPDATE seo_metadata SET
                page_path = $2, page_type = $3, meta_title = $4, meta_description = $5,
                keywords = $6, canonical_url = $7,
                robots_index = $8, robots_follow = $9, robots_noarchive = $10, robots_nosnippet = $11,
                robots_max_snippet = $12, robots_max_image_preview = $13, robots_max_video_preview = $14,
                og_title = $15, og_description = $16, og_image = $17, og_image_alt = $18, og_type = $19,
                twitter_card = $20, twitter_title = $21, twitter_description = $22, twitter_image = $23,
                schema_enabled = $24, schema_types = $25, schema_data = $26,
                is_active = $27, updated_by = $28,
                updated_at = datetime('now', 'subsec')
            WHERE id = $1"#,
        )
        .bind(record.id)
        .bind(&record.page_path)
        .bind(record.page_type)
        .bind(&record.meta_title)
        .bind(&record.meta_description)
        .bind(Json(&record.keywords))
        .bind(&record.canonical_url)
        .bind(record.robots_index)
        .bind(record.robots_follow)
        .bind(record.robots_noarchive)
        .bind(record.robots_nosnippet)
        .bind(record.robots_max_snippet)
        .bind(record.robots_max_image_preview)
        .bind(record.robots_max_video_preview)
        .bind(&record.og_title)
        .bind(&record.og_description)
        .bind(&record.og_image)
        .bind(&record.og_image_alt)
        .bind(&record.og_type)
        .bind(record.twitter_card)
        .bind(&record.twitter_title)
        .bind(&record.twitter_description)
        .bind(&record.twitter_image)
        .bind(record.schema_enabled)
        .bind(Json(&record.schema_types))
        .bind(Json(&record.schema_data))
        .bind(record.is_active)
        .bind(&record.updated_by)
        .execute(executor)
        .await
        .map_err(|e| map_unique_violation(e, &record.page_path))?;
        Ok(())
    }

    /// Store the result of a validator run as the cached score
    pub async fn update_score(
        pool: &SqlitePool,
        id: Uuid,
        score: i32,
        issues: &[SeoIssue],
        warnings: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE seo_metadata
               SET seo_score = $2,
                   seo_issues = $3,
                   seo_warnings = $4,
                   scored_at = datetime('now', 'subsec')
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(score.clamp(0, 100))
        .bind(Json(issues))
        .bind(Json(warnings))
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM seo_metadata WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
