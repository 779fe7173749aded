use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// `<changefreq>` values accepted by the sitemap protocol
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct SitemapEntry {
    pub path: String,
    #[serde(default)]
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default = "default_include")]
    pub include: bool,
}

fn default_include() -> bool {
    true
}

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS)]
pub struct SitemapConfig {
    #[sqlx(json)]
    pub entries: Vec<SitemapEntry>,
    pub last_generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateSitemapConfig {
    pub entries: Vec<SitemapEntry>,
}

impl SitemapConfig {
    /// The stored configuration, or an empty one if nothing was saved yet
    pub async fn load(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let config = sqlx::query_as::<_, SitemapConfig>(
            "SELECT entries, last_generated_at FROM sitemap_config WHERE id = 1",
        )
        .fetch_optional(pool)
        .await?;
        Ok(config.unwrap_or_default())
    }

    pub async fn save_entries(
        pool: &SqlitePool,
        entries: &[SitemapEntry],
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SitemapConfig>(
            r#"INSERT INTO sitemap_config (id, entries)
               VALUES (1, $1)
               ON CONFLICT(id) DO UPDATE SET
                   entries = excluded.entries,
                   updated_at = datetime('now', 'subsec')
               RETURNING entries, last_generated_at"#,
        )
        .bind(Json(entries))
        .fetch_one(pool)
        .await
    }

    pub async fn mark_generated(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO sitemap_config (id, last_generated_at)
               VALUES (1, datetime('now', 'subsec'))
               ON CONFLICT(id) DO UPDATE SET
                   last_generated_at = datetime('now', 'subsec')"#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}
