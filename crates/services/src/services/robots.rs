//! robots.txt rendering and validation.

use chrono::{DateTime, Utc};
use db::models::robots::RobotsConfig;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;

const KNOWN_DIRECTIVES: [&str; 6] = [
    "user-agent",
    "allow",
    "disallow",
    "sitemap",
    "crawl-delay",
    "host",
];

#[derive(Debug, Error, PartialEq)]
pub enum RobotsError {
    #[error("robots.txt content is empty")]
    Empty,
    #[error("line {line}: expected `directive: value`, got {text:?}")]
    MalformedLine { line: usize, text: String },
    #[error("line {line}: unknown directive {directive:?}")]
    UnknownDirective { line: usize, directive: String },
    #[error("line {line}: {directive} appears before any User-agent")]
    RuleWithoutUserAgent { line: usize, directive: String },
}

/// The robots.txt currently in effect. `is_default` is set when nothing has
/// been stored and the rendered default is served instead. `sitemaps` lists
/// the `Sitemap:` URLs declared in `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct RobotsFile {
    pub content: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub is_default: bool,
    pub sitemaps: Vec<String>,
}

impl From<RobotsConfig> for RobotsFile {
    fn from(config: RobotsConfig) -> Self {
        Self {
            sitemaps: sitemap_urls(&config.content),
            content: config.content,
            updated_at: Some(config.updated_at),
            updated_by: config.updated_by,
            is_default: false,
        }
    }
}

pub async fn load_or_default(pool: &SqlitePool, site_url: &str) -> Result<RobotsFile, sqlx::Error> {
    Ok(match RobotsConfig::find(pool).await? {
        Some(config) => config.into(),
        None => {
            let content = render_default(site_url);
            RobotsFile {
                sitemaps: sitemap_urls(&content),
                content,
                updated_at: None,
                updated_by: None,
                is_default: true,
            }
        }
    })
}

/// The file served when nothing has been stored yet
pub fn render_default(site_url: &str) -> String {
    let site_url = site_url.trim_end_matches('/');
    format!(
        "User-agent: *\n\
         Allow: /\n\
         Disallow: /api/\n\
         Disallow: /admin/\n\
         \n\
         Sitemap: {site_url}/sitemap.xml\n"
    )
}

/// Checks that every non-comment line is a known `directive: value` pair and
/// that path rules belong to a User-agent group.
pub fn validate(content: &str) -> Result<(), RobotsError> {
    if content.trim().is_empty() {
        return Err(RobotsError::Empty);
    }

    let mut in_group = false;
    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        let Some((directive, _value)) = text.split_once(':') else {
            return Err(RobotsError::MalformedLine {
                line,
                text: raw.to_string(),
            });
        };
        let directive = directive.trim().to_ascii_lowercase();
        if !KNOWN_DIRECTIVES.contains(&directive.as_str()) {
            return Err(RobotsError::UnknownDirective { line, directive });
        }
        match directive.as_str() {
            "user-agent" => in_group = true,
            "allow" | "disallow" | "crawl-delay" if !in_group => {
                return Err(RobotsError::RuleWithoutUserAgent { line, directive });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Sitemap URLs declared in the file
pub fn sitemap_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(directive, _)| directive.trim().eq_ignore_ascii_case("sitemap"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use db::{DBService, models::robots::UpdateRobotsConfig};

    use super::*;

    #[tokio::test]
    async fn test_load_or_default() {
        let db = DBService::new_in_memory().await.unwrap();
        let file = load_or_default(&db.pool, "https://writekit.example").await.unwrap();
        assert!(file.is_default);
        assert!(file.updated_at.is_none());
        assert_eq!(file.sitemaps, vec!["https://writekit.example/sitemap.xml"]);

        RobotsConfig::replace(
            &db.pool,
            &UpdateRobotsConfig {
                content: "User-agent: *\nDisallow: /\n".to_string(),
                updated_by: Some("ops".to_string()),
            },
        )
        .await
        .unwrap();
        let file = load_or_default(&db.pool, "https://writekit.example").await.unwrap();
        assert!(!file.is_default);
        assert_eq!(file.content, "User-agent: *\nDisallow: /\n");
        assert_eq!(file.updated_by.as_deref(), Some("ops"));
        assert!(file.sitemaps.is_empty());
    }

    #[test]
    fn test_default_is_valid_and_points_at_sitemap() {
        let content = render_default("https://writekit.example/");
        assert!(validate(&content).is_ok());
        assert_eq!(
            sitemap_urls(&content),
            vec!["https://writekit.example/sitemap.xml"]
        );
    }

    #[test]
    fn test_rejects_empty_content() {
        assert_eq!(validate("  \n"), Err(RobotsError::Empty));
    }

    #[test]
    fn test_comments_are_ignored() {
        let content = "# staging\nUser-agent: *  # everyone\nDisallow: /\n";
        assert!(validate(content).is_ok());
    }

    #[test]
    fn test_reports_offending_line() {
        assert_eq!(
            validate("User-agent: *\nNoindex: /private\n"),
            Err(RobotsError::UnknownDirective {
                line: 2,
                directive: "noindex".to_string()
            })
        );
        assert!(matches!(
            validate("User-agent: *\nDisallow /tmp\n"),
            Err(RobotsError::MalformedLine { line: 2, .. })
        ));
        assert!(matches!(
            validate("Disallow: /tmp\nUser-agent: *\n"),
            Err(RobotsError::RuleWithoutUserAgent { line: 1, .. })
        ));
    }
}
