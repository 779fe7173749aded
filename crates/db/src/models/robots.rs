use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// The live robots.txt file. There is at most one row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct RobotsConfig {
    pub content: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

/// A previous robots.txt revision, archived whenever the file is replaced
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct RobotsHistoryEntry {
    pub id: Uuid,
    pub content: String,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateRobotsConfig {
    pub content: String,
    pub updated_by: Option<String>,
}

impl RobotsConfig {
    pub async fn find(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RobotsConfig>(
            "SELECT content, updated_at, updated_by FROM robots_config WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
    }

    /// Replace the robots.txt content, archiving the previous revision in the
    /// same transaction.
    pub async fn replace(
        pool: &SqlitePool,
        data: &UpdateRobotsConfig,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous = sqlx::query_as::<_, RobotsConfig>(
            "SELECT content, updated_at, updated_by FROM robots_config WHERE id = 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(previous) = previous {
            sqlx::query(
                "INSERT INTO robots_history (id, content, changed_at, changed_by) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(&previous.content)
            .bind(previous.updated_at)
            .bind(&previous.updated_by)
            .execute(&mut *tx)
            .await?;
        }

        let config = sqlx::query_as::<_, RobotsConfig>(
            r#"INSERT INTO robots_config (id, content, updated_by)
               VALUES (1, $1, $2)
               ON CONFLICT(id) DO UPDATE SET
                   content = excluded.content,
                   updated_by = excluded.updated_by,
                   updated_at = datetime('now', 'subsec')
               RETURNING content, updated_at, updated_by"#,
        )
        .bind(&data.content)
        .bind(&data.updated_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(config)
    }
}

impl RobotsHistoryEntry {
    pub async fn find_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RobotsHistoryEntry>(
            r#"SELECT id, content, changed_at, changed_by
               FROM robots_history
               ORDER BY changed_at DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
