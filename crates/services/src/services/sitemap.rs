//! XML sitemap rendering and discovery of pages missing from it.

use std::collections::HashSet;

use db::models::{
    seo_metadata::{PageType, SeoMetadata, SeoMetadataError, SeoMetadataFilter, normalize_page_path},
    sitemap::{ChangeFrequency, SitemapConfig, SitemapEntry},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

use super::metadata_generator::SiteConfig;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const URLSET_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Metadata(#[from] SeoMetadataError),
    #[error("priority for {path} must be between 0.0 and 1.0, got {priority}")]
    InvalidPriority { path: String, priority: f32 },
    #[error("duplicate sitemap path: {0}")]
    DuplicatePath(String),
}

/// Response of `POST /sitemap/generate`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct GeneratedSitemap {
    pub xml: String,
    pub url_count: usize,
}

/// Default `(priority, changefreq)` for a page type
pub fn defaults_for(page_type: PageType) -> (f32, ChangeFrequency) {
    match page_type {
        PageType::Home => (1.0, ChangeFrequency::Daily),
        PageType::Tool => (0.9, ChangeFrequency::Weekly),
        PageType::Category | PageType::Landing | PageType::Product => {
            (0.8, ChangeFrequency::Weekly)
        }
        PageType::Article => (0.7, ChangeFrequency::Monthly),
        PageType::Faq => (0.6, ChangeFrequency::Monthly),
        PageType::About | PageType::Contact | PageType::Custom => (0.5, ChangeFrequency::Yearly),
    }
}

/// Normalizes paths in place and rejects bad priorities or duplicates
pub fn validate_entries(entries: &mut [SitemapEntry]) -> Result<(), SitemapError> {
    let mut seen = HashSet::new();
    for entry in entries.iter_mut() {
        entry.path = normalize_page_path(&entry.path)?;
        if !(0.0..=1.0).contains(&entry.priority) {
            return Err(SitemapError::InvalidPriority {
                path: entry.path.clone(),
                priority: entry.priority,
            });
        }
        if !seen.insert(entry.path.clone()) {
            return Err(SitemapError::DuplicatePath(entry.path.clone()));
        }
    }
    Ok(())
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a `<urlset>` document for the included entries
pub fn generate(site: &SiteConfig, entries: &[SitemapEntry]) -> String {
    let mut xml = format!("{XML_HEADER}\n<urlset xmlns=\"{URLSET_NS}\">\n");
    for entry in entries.iter().filter(|e| e.include) {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape_xml(&site.absolute_url(&entry.path))
        ));
        if let Some(modified) = entry.last_modified {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                modified.format("%Y-%m-%d")
            ));
        }
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.change_frequency
        ));
        xml.push_str(&format!(
            "    <priority>{:.1}</priority>\n",
            entry.priority.clamp(0.0, 1.0)
        ));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Active, indexable records whose path has no sitemap entry yet
pub fn discover(records: &[SeoMetadata], existing: &[SitemapEntry]) -> Vec<SitemapEntry> {
    let known: HashSet<&str> = existing.iter().map(|e| e.path.as_str()).collect();
    records
        .iter()
        .filter(|r| r.is_active && r.robots_index && !known.contains(r.page_path.as_str()))
        .map(|r| {
            let (priority, change_frequency) = defaults_for(r.page_type);
            SitemapEntry {
                path: r.page_path.clone(),
                change_frequency,
                priority,
                last_modified: Some(r.updated_at),
                include: true,
            }
        })
        .collect()
}

/// Render the stored sitemap and stamp `last_generated_at`
pub async fn regenerate(
    pool: &SqlitePool,
    site: &SiteConfig,
) -> Result<GeneratedSitemap, SitemapError> {
    let config = SitemapConfig::load(pool).await?;
    let xml = generate(site, &config.entries);
    SitemapConfig::mark_generated(pool).await?;
    let url_count = config.entries.iter().filter(|e| e.include).count();
    info!(url_count, "Generated sitemap");
    Ok(GeneratedSitemap { xml, url_count })
}

/// Proposed entries for active records not yet in the stored sitemap
pub async fn discover_missing(pool: &SqlitePool) -> Result<Vec<SitemapEntry>, SitemapError> {
    let config = SitemapConfig::load(pool).await?;
    let records = SeoMetadata::find_all(
        pool,
        &SeoMetadataFilter {
            page_type: None,
            active: Some(true),
        },
    )
    .await?;
    let proposed = discover(&records, &config.entries);
    info!(
        proposed = proposed.len(),
        existing = config.entries.len(),
        "Discovered pages missing from sitemap"
    );
    Ok(proposed)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use db::{DBService, models::seo_metadata::CreateSeoMetadata};
    use uuid::Uuid;

    use super::*;

    fn entry(path: &str, priority: f32) -> SitemapEntry {
        SitemapEntry {
            path: path.to_string(),
            change_frequency: ChangeFrequency::Weekly,
            priority,
            last_modified: None,
            include: true,
        }
    }

    #[test]
    fn test_generate_renders_included_entries_only() {
        let site = SiteConfig::new("WriteKit", "https://writekit.example");
        let mut hidden = entry("/drafts", 0.3);
        hidden.include = false;
        let mut home = entry("/", 1.0);
        home.last_modified = Some(Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap());

        let xml = generate(&site, &[home, entry("/tools/a&b", 0.8), hidden]);

        assert!(xml.starts_with(XML_HEADER));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://writekit.example/</loc>"));
        assert!(xml.contains("<lastmod>2025-03-14</lastmod>"));
        assert!(xml.contains("<loc>https://writekit.example/tools/a&amp;b</loc>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(!xml.contains("/drafts"));
    }

    #[test]
    fn test_validate_entries() {
        let mut entries = vec![entry("tools/", 0.5)];
        validate_entries(&mut entries).unwrap();
        assert_eq!(entries[0].path, "/tools");

        let mut bad_priority = vec![entry("/", 1.5)];
        assert!(matches!(
            validate_entries(&mut bad_priority),
            Err(SitemapError::InvalidPriority { .. })
        ));

        let mut duplicates = vec![entry("/faq", 0.5), entry("/faq/", 0.5)];
        assert!(matches!(
            validate_entries(&mut duplicates),
            Err(SitemapError::DuplicatePath(path)) if path == "/faq"
        ));
    }

    #[tokio::test]
    async fn test_discover_missing_skips_known_inactive_and_noindex() {
        let db = DBService::new_in_memory().await.unwrap();
        for (path, page_type, active, index) in [
            ("/", PageType::Home, true, true),
            ("/tools/summarizer", PageType::Tool, true, true),
            ("/old", PageType::Custom, false, true),
            ("/thank-you", PageType::Custom, true, false),
        ] {
            SeoMetadata::create(
                &db.pool,
                Uuid::new_v4(),
                &CreateSeoMetadata {
                    page_path: path.to_string(),
                    page_type: Some(page_type),
                    is_active: Some(active),
                    robots_index: Some(index),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        SitemapConfig::save_entries(&db.pool, &[entry("/", 1.0)])
            .await
            .unwrap();

        let proposed = discover_missing(&db.pool).await.unwrap();
        assert_eq!(proposed.len(), 1);
        assert_eq!(proposed[0].path, "/tools/summarizer");
        assert_eq!(proposed[0].priority, 0.9);
        assert!(proposed[0].last_modified.is_some());
    }

    #[tokio::test]
    async fn test_regenerate_marks_generated() {
        let db = DBService::new_in_memory().await.unwrap();
        SitemapConfig::save_entries(&db.pool, &[entry("/", 1.0)])
            .await
            .unwrap();
        let site = SiteConfig::new("WriteKit", "https://writekit.example");

        let generated = regenerate(&db.pool, &site).await.unwrap();
        assert_eq!(generated.url_count, 1);
        assert!(generated.xml.contains("<loc>https://writekit.example/</loc>"));
        let config = SitemapConfig::load(&db.pool).await.unwrap();
        assert!(config.last_generated_at.is_some());
    }
}
