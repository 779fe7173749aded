use std::env;

use services::services::metadata_generator::SiteConfig;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:seo_admin.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_LOG_FILTER: &str = "server=info,services=info,db=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub site: SiteConfig,
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_opt)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let site_url = get_or("SITE_URL", "http://localhost:3000");
        if !(site_url.starts_with("http://") || site_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "SITE_URL",
                value: site_url,
                reason: "must be an absolute http(s) URL".to_string(),
            });
        }

        let mut site = SiteConfig::new(get_or("SITE_NAME", "AI Tools"), site_url);
        site.default_og_image = lookup("SITE_DEFAULT_OG_IMAGE");
        site.twitter_handle = lookup("SITE_TWITTER_HANDLE");
        site.logo_url = lookup("SITE_LOGO_URL");

        Ok(Self {
            database_url: get_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            host: get_or("HOST", DEFAULT_HOST),
            port,
            site,
        })
    }
}

/// `RUST_LOG` if set, otherwise the crate-level defaults
pub fn log_filter() -> String {
    env_or("RUST_LOG", DEFAULT_LOG_FILTER)
}
