//! Client for the SEO admin REST API.

use std::time::Duration;

use db::models::{
    robots::{RobotsHistoryEntry, UpdateRobotsConfig},
    seo_metadata::{
        BulkUpdateResponse, BulkUpdateSeoMetadata, CreateSeoMetadata, SeoMetadata,
        SeoMetadataFilter, UpdateSeoMetadata,
    },
    sitemap::{SitemapConfig, SitemapEntry, UpdateSitemapConfig},
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::{
    metadata_generator::PagePreview, robots::RobotsFile, seo_scoring::RecalculateSummary,
    seo_validation::ValidationResult, sitemap::GeneratedSitemap,
};

pub const BASE_URL_ENV: &str = "SEO_ADMIN_API_URL";

#[derive(Debug, Clone, Error)]
pub enum AdminApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("json error: {0}")]
    Serde(String),
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("missing base url: SEO_ADMIN_API_URL environment variable not set")]
    MissingBaseUrl,
}

/// Error body returned by the admin API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Admin API client. Requests are sent once; failures are returned to the
/// caller without retrying.
#[derive(Debug, Clone)]
pub struct AdminApiClient {
    http: Client,
    base_url: String,
}

impl AdminApiClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client using the SEO_ADMIN_API_URL environment variable
    pub fn from_env() -> Result<Self, AdminApiError> {
        let base_url = std::env::var(BASE_URL_ENV).map_err(|_| AdminApiError::MissingBaseUrl)?;
        Self::new(&base_url)
    }

    pub fn new(base_url: &str) -> Result<Self, AdminApiError> {
        let parsed = Url::parse(base_url).map_err(|e| AdminApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AdminApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("seo-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdminApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AdminApiError> {
        let res = request.send().await.map_err(map_reqwest_error)?;
        let status = res.status();
        debug!(url = %res.url(), status = status.as_u16(), "Admin API response");
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        let message = error_message(status.as_u16(), &body);
        warn!(status = status.as_u16(), message = %message, "Admin API request failed");
        Err(AdminApiError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, AdminApiError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AdminApiError::Serde(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdminApiError> {
        self.send_json(self.request(Method::GET, path)).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdminApiError> {
        self.send_json(self.request(Method::POST, path)).await
    }

    async fn with_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, AdminApiError> {
        self.send_json(self.request(method, path).json(body)).await
    }

    /// GET /metadata
    pub async fn list_metadata(
        &self,
        filter: &SeoMetadataFilter,
    ) -> Result<Vec<SeoMetadata>, AdminApiError> {
        self.send_json(self.request(Method::GET, "/metadata").query(filter))
            .await
    }

    /// GET /metadata/{id}
    pub async fn get_metadata(&self, id: Uuid) -> Result<SeoMetadata, AdminApiError> {
        self.get(&format!("/metadata/{id}")).await
    }

    /// POST /metadata
    pub async fn create_metadata(
        &self,
        data: &CreateSeoMetadata,
    ) -> Result<SeoMetadata, AdminApiError> {
        self.with_body(Method::POST, "/metadata", data).await
    }

    /// PUT /metadata/{id}
    pub async fn update_metadata(
        &self,
        id: Uuid,
        data: &UpdateSeoMetadata,
    ) -> Result<SeoMetadata, AdminApiError> {
        self.with_body(Method::PUT, &format!("/metadata/{id}"), data)
            .await
    }

    /// DELETE /metadata/{id}
    pub async fn delete_metadata(&self, id: Uuid) -> Result<(), AdminApiError> {
        self.send(self.request(Method::DELETE, &format!("/metadata/{id}")))
            .await?;
        Ok(())
    }

    /// POST /metadata/{id}/score
    pub async fn score_metadata(&self, id: Uuid) -> Result<ValidationResult, AdminApiError> {
        self.post(&format!("/metadata/{id}/score")).await
    }

    /// GET /metadata/{id}/preview
    pub async fn preview_metadata(&self, id: Uuid) -> Result<PagePreview, AdminApiError> {
        self.get(&format!("/metadata/{id}/preview")).await
    }

    /// GET /metadata/lookup?path=
    pub async fn lookup_metadata(&self, page_path: &str) -> Result<PagePreview, AdminApiError> {
        self.send_json(
            self.request(Method::GET, "/metadata/lookup")
                .query(&[("path", page_path)]),
        )
        .await
    }

    /// PUT /metadata/bulk
    pub async fn bulk_update_metadata(
        &self,
        data: &BulkUpdateSeoMetadata,
    ) -> Result<BulkUpdateResponse, AdminApiError> {
        self.with_body(Method::PUT, "/metadata/bulk", data).await
    }

    /// GET /robots
    pub async fn get_robots(&self) -> Result<RobotsFile, AdminApiError> {
        self.get("/robots").await
    }

    /// PUT /robots
    pub async fn update_robots(
        &self,
        data: &UpdateRobotsConfig,
    ) -> Result<RobotsFile, AdminApiError> {
        self.with_body(Method::PUT, "/robots", data).await
    }

    /// GET /robots/history
    pub async fn robots_history(&self) -> Result<Vec<RobotsHistoryEntry>, AdminApiError> {
        self.get("/robots/history").await
    }

    /// GET /sitemap
    pub async fn get_sitemap(&self) -> Result<SitemapConfig, AdminApiError> {
        self.get("/sitemap").await
    }

    /// PUT /sitemap
    pub async fn update_sitemap(
        &self,
        data: &UpdateSitemapConfig,
    ) -> Result<SitemapConfig, AdminApiError> {
        self.with_body(Method::PUT, "/sitemap", data).await
    }

    /// POST /sitemap/generate
    pub async fn generate_sitemap(&self) -> Result<GeneratedSitemap, AdminApiError> {
        self.post("/sitemap/generate").await
    }

    /// POST /sitemap/discover
    pub async fn discover_sitemap(&self) -> Result<Vec<SitemapEntry>, AdminApiError> {
        self.post("/sitemap/discover").await
    }

    /// POST /scores/recalculate
    pub async fn recalculate_scores(&self) -> Result<RecalculateSummary, AdminApiError> {
        self.post("/scores/recalculate").await
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AdminApiError {
    if e.is_timeout() {
        AdminApiError::Timeout
    } else {
        AdminApiError::Transport(e.to_string())
    }
}

/// The `error` field of a JSON error body, else the raw body, else the
/// status reason
fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed")
        .to_string()
}
