//! Assembles the page-level metadata object and JSON-LD consumed by the
//! rendering layer.

use db::models::seo_metadata::{ImagePreviewSize, PageType, SeoMetadata, TwitterCardType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use ts_rs::TS;

use super::schema_generators::{
    self, AggregateRating, ArticleSchemaConfig, BreadcrumbItem, FaqItem, OrganizationSchemaConfig,
    SoftwareApplicationSchemaConfig, WebPageSchemaConfig,
};

/// Site-wide settings. Built once at startup and shared by reference.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SiteConfig {
    pub site_name: String,
    /// Absolute origin without a trailing slash, e.g. `https://example.com`
    pub site_url: String,
    pub default_og_image: Option<String>,
    pub twitter_handle: Option<String>,
    pub locale: String,
    pub logo_url: Option<String>,
    pub organization_description: Option<String>,
    #[serde(default)]
    pub same_as: Vec<String>,
}

impl SiteConfig {
    pub fn new(site_name: impl Into<String>, site_url: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            site_url: site_url.into().trim_end_matches('/').to_string(),
            default_og_image: None,
            twitter_handle: None,
            locale: "en_US".to_string(),
            logo_url: None,
            organization_description: None,
            same_as: Vec::new(),
        }
    }

    /// Absolute URL for a site-relative path
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match path.trim_start_matches('/') {
            "" => format!("{}/", self.site_url),
            rest => format!("{}/{}", self.site_url, rest),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct RobotsOverrides {
    pub index: Option<bool>,
    pub follow: Option<bool>,
    pub noarchive: Option<bool>,
    pub nosnippet: Option<bool>,
    pub max_snippet: Option<i32>,
    pub max_image_preview: Option<ImagePreviewSize>,
    pub max_video_preview: Option<i32>,
}

/// Inputs for the page-specific schema builder
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct SchemaPageData {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub faqs: Vec<FaqItem>,
    #[serde(default)]
    pub breadcrumbs: Vec<BreadcrumbItem>,
    pub author_name: Option<String>,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub application_category: Option<String>,
    pub rating: Option<AggregateRating>,
}

/// Per-page values supplied by the caller. Anything left `None` is filled from
/// the site config or the per-page-type defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct MetadataOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub robots: RobotsOverrides,
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
    /// Stored structured data used verbatim instead of the generated page schema
    pub custom_schema: Option<Value>,
    #[serde(default)]
    pub schema: SchemaPageData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RobotsMeta {
    pub index: bool,
    pub follow: bool,
    pub noarchive: bool,
    pub nosnippet: bool,
    pub max_snippet: Option<i32>,
    pub max_image_preview: Option<ImagePreviewSize>,
    pub max_video_preview: Option<i32>,
}

impl RobotsMeta {
    /// Value for `<meta name="robots" content="...">`
    pub fn content(&self) -> String {
        let mut directives = vec![
            if self.index { "index" } else { "noindex" }.to_string(),
            if self.follow { "follow" } else { "nofollow" }.to_string(),
        ];
        if self.noarchive {
            directives.push("noarchive".to_string());
        }
        if self.nosnippet {
            directives.push("nosnippet".to_string());
        }
        if let Some(n) = self.max_snippet {
            directives.push(format!("max-snippet:{n}"));
        }
        if let Some(size) = self.max_image_preview {
            directives.push(format!("max-image-preview:{size}"));
        }
        if let Some(n) = self.max_video_preview {
            directives.push(format!("max-video-preview:{n}"));
        }
        directives.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct OpenGraphImage {
    pub url: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraphMeta {
    pub title: String,
    pub description: String,
    pub url: String,
    pub site_name: String,
    pub locale: String,
    #[serde(rename = "type")]
    pub og_type: String,
    pub images: Vec<OpenGraphImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct TwitterMeta {
    pub card: TwitterCardType,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub creator: Option<String>,
}

/// Platform metadata object handed to the page-rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical: String,
    pub robots: RobotsMeta,
    pub open_graph: OpenGraphMeta,
    pub twitter: TwitterMeta,
    /// Serialized JSON-LD, absent when structured data is disabled
    pub json_ld: Option<String>,
}

/// Response of the preview endpoint: the rendered metadata plus the ready
/// `<script>` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct PagePreview {
    pub metadata: PageMetadata,
    pub json_ld_script: Option<String>,
}

/// Fixed fallback description for each page type
pub fn default_description(page_type: PageType) -> &'static str {
    match page_type {
        PageType::Home => {
            "Free AI writing tools for everyone: paraphrase, fix grammar, summarize, translate and create content in seconds."
        }
        PageType::Tool => {
            "Use this free AI-powered tool to get fast, high-quality results. No sign-up required."
        }
        PageType::Article => "Guides, tips and insights on writing, productivity and AI tools.",
        PageType::Faq => "Answers to frequently asked questions about our AI writing tools.",
        PageType::Landing => "Discover AI writing tools that help you create better content faster.",
        PageType::Category => "Browse our collection of free AI writing and productivity tools.",
        PageType::Product => "Explore features, pricing and plans for our AI writing tools.",
        PageType::About => "Learn about our mission to make AI writing tools free and accessible.",
        PageType::Contact => "Get in touch with our team for support, feedback or partnerships.",
        PageType::Custom => "Free AI writing and productivity tools.",
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Title-cased label for a URL path segment: `grammar-checker` -> `Grammar Checker`
fn segment_label(segment: &str) -> String {
    segment
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub struct MetadataGenerator {
    site: SiteConfig,
}

impl MetadataGenerator {
    pub fn new(site: SiteConfig) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Page title with the site-name suffix. Home pages keep the bare title;
    /// an empty title becomes the site name.
    pub fn build_title(&self, page_type: PageType, title: Option<&str>) -> String {
        match title.map(str::trim).filter(|t| !t.is_empty()) {
            None => self.site.site_name.clone(),
            Some(title) if page_type == PageType::Home => title.to_string(),
            Some(title) => format!("{} | {}", title, self.site.site_name),
        }
    }

    /// Breadcrumb trail for a path with more than one segment
    pub fn breadcrumbs_for_path(&self, page_path: &str) -> Vec<BreadcrumbItem> {
        let segments: Vec<&str> = page_path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Vec::new();
        }
        let mut items = vec![BreadcrumbItem {
            name: "Home".to_string(),
            url: self.site.absolute_url("/"),
        }];
        for depth in 1..=segments.len() {
            let path = format!("/{}", segments[..depth].join("/"));
            items.push(BreadcrumbItem {
                name: segment_label(segments[depth - 1]),
                url: self.site.absolute_url(&path),
            });
        }
        items
    }

    pub fn generate(
        &self,
        page_path: &str,
        page_type: PageType,
        overrides: &MetadataOverrides,
    ) -> PageMetadata {
        let raw_title = non_empty(&overrides.title);
        let title = self.build_title(page_type, raw_title);
        let description = non_empty(&overrides.description)
            .unwrap_or_else(|| default_description(page_type))
            .to_string();
        let canonical = non_empty(&overrides.canonical_url)
            .map(|url| self.site.absolute_url(url))
            .unwrap_or_else(|| self.site.absolute_url(page_path));

        let robots = RobotsMeta {
            index: overrides.robots.index.unwrap_or(true),
            follow: overrides.robots.follow.unwrap_or(true),
            noarchive: overrides.robots.noarchive.unwrap_or(false),
            nosnippet: overrides.robots.nosnippet.unwrap_or(false),
            max_snippet: overrides.robots.max_snippet,
            max_image_preview: overrides.robots.max_image_preview,
            max_video_preview: overrides.robots.max_video_preview,
        };

        // Fallbacks resolve once, here: Twitter -> Open Graph -> base.
        let og_image = non_empty(&overrides.og_image)
            .or(self.site.default_og_image.as_deref())
            .map(|url| self.site.absolute_url(url));
        let open_graph = OpenGraphMeta {
            title: non_empty(&overrides.og_title).map_or_else(|| title.clone(), str::to_string),
            description: non_empty(&overrides.og_description)
                .map_or_else(|| description.clone(), str::to_string),
            url: canonical.clone(),
            site_name: self.site.site_name.clone(),
            locale: self.site.locale.clone(),
            og_type: non_empty(&overrides.og_type)
                .unwrap_or(match page_type {
                    PageType::Article => "article",
                    _ => "website",
                })
                .to_string(),
            images: og_image
                .iter()
                .map(|url| OpenGraphImage {
                    url: url.clone(),
                    alt: non_empty(&overrides.og_image_alt).map(str::to_string),
                })
                .collect(),
        };

        let twitter_image = non_empty(&overrides.twitter_image)
            .map(|url| self.site.absolute_url(url))
            .or_else(|| og_image.clone());
        let twitter = TwitterMeta {
            card: overrides
                .twitter_card
                .unwrap_or(TwitterCardType::SummaryLargeImage),
            title: non_empty(&overrides.twitter_title)
                .or(non_empty(&overrides.og_title))
                .map_or_else(|| title.clone(), str::to_string),
            description: non_empty(&overrides.twitter_description)
                .or(non_empty(&overrides.og_description))
                .map_or_else(|| description.clone(), str::to_string),
            images: twitter_image.into_iter().collect(),
            creator: self.site.twitter_handle.clone(),
        };

        let json_ld = overrides.schema_enabled.unwrap_or(true).then(|| {
            let custom = overrides
                .custom_schema
                .as_ref()
                .map(custom_schema_objects)
                .unwrap_or_default();
            if !custom.is_empty() {
                let mut schemas = vec![self.organization_schema()];
                schemas.extend(custom);
                return schema_generators::combine_schemas(&schemas);
            }
            let mut data = overrides.schema.clone();
            data.name
                .get_or_insert_with(|| raw_title.unwrap_or(&self.site.site_name).to_string());
            data.description.get_or_insert_with(|| description.clone());
            data.url.get_or_insert_with(|| canonical.clone());
            if data.image.is_none() {
                data.image = og_image.clone();
            }
            if data.breadcrumbs.is_empty() {
                data.breadcrumbs = self.breadcrumbs_for_path(page_path);
            }
            self.generate_schema(page_type, &data)
        });

        debug!(
            page_path = %page_path,
            page_type = %page_type,
            has_json_ld = json_ld.is_some(),
            "Generated page metadata"
        );

        PageMetadata {
            title,
            description,
            keywords: overrides.keywords.clone(),
            canonical,
            robots,
            open_graph,
            twitter,
            json_ld,
        }
    }

    /// Metadata for a stored record
    pub fn generate_for_record(&self, record: &SeoMetadata) -> PageMetadata {
        self.generate(&record.page_path, record.page_type, &Self::overrides_from_record(record))
    }

    pub fn preview(&self, record: &SeoMetadata) -> PagePreview {
        let metadata = self.generate_for_record(record);
        let script = metadata.json_ld.as_deref().map(json_ld_script);
        PagePreview {
            metadata,
            json_ld_script: script,
        }
    }

    pub fn overrides_from_record(record: &SeoMetadata) -> MetadataOverrides {
        MetadataOverrides {
            title: record.meta_title.clone(),
            description: record.meta_description.clone(),
            keywords: record.keywords.clone(),
            canonical_url: record.canonical_url.clone(),
            robots: RobotsOverrides {
                index: Some(record.robots_index),
                follow: Some(record.robots_follow),
                noarchive: Some(record.robots_noarchive),
                nosnippet: Some(record.robots_nosnippet),
                max_snippet: record.robots_max_snippet,
                max_image_preview: record.robots_max_image_preview,
                max_video_preview: record.robots_max_video_preview,
            },
            og_title: record.og_title.clone(),
            og_description: record.og_description.clone(),
            og_image: record.og_image.clone(),
            og_image_alt: record.og_image_alt.clone(),
            og_type: record.og_type.clone(),
            twitter_card: record.twitter_card,
            twitter_title: record.twitter_title.clone(),
            twitter_description: record.twitter_description.clone(),
            twitter_image: record.twitter_image.clone(),
            schema_enabled: Some(record.schema_enabled),
            custom_schema: record.schema_data.clone(),
            schema: SchemaPageData::default(),
        }
    }

    pub fn organization_schema(&self) -> Value {
        schema_generators::organization(&OrganizationSchemaConfig {
            name: self.site.site_name.clone(),
            url: self.site.absolute_url("/"),
            logo: self.site.logo_url.clone(),
            description: self.site.organization_description.clone(),
            same_as: self.site.same_as.clone(),
            contact_email: None,
            contact_phone: None,
        })
    }

    /// JSON-LD for a page: the site Organization first, then the schema
    /// matching the page type, then breadcrumbs when present.
    pub fn generate_schema(&self, page_type: PageType, data: &SchemaPageData) -> String {
        let name = data.name.clone().unwrap_or_else(|| self.site.site_name.clone());
        let description = data
            .description
            .clone()
            .unwrap_or_else(|| default_description(page_type).to_string());
        let url = data.url.clone().unwrap_or_else(|| self.site.absolute_url("/"));

        let web_page = || {
            schema_generators::web_page(&WebPageSchemaConfig {
                name: name.clone(),
                description: description.clone(),
                url: url.clone(),
                in_language: Some(self.site.locale.replace('_', "-")),
                date_modified: data.date_modified.clone(),
            })
        };

        let page_schema = match page_type {
            PageType::Home => web_page(),
            PageType::Tool => {
                schema_generators::software_application(&SoftwareApplicationSchemaConfig {
                    name: name.clone(),
                    description: description.clone(),
                    url: url.clone(),
                    application_category: data.application_category.clone(),
                    operating_system: None,
                    price: None,
                    price_currency: None,
                    rating: data.rating,
                })
            }
            PageType::Article => schema_generators::article(&ArticleSchemaConfig {
                headline: name.clone(),
                description: description.clone(),
                url: url.clone(),
                image: data.image.clone(),
                author_name: data
                    .author_name
                    .clone()
                    .unwrap_or_else(|| self.site.site_name.clone()),
                author_url: None,
                publisher_name: self.site.site_name.clone(),
                publisher_logo: self.site.logo_url.clone(),
                date_published: data.date_published.clone().unwrap_or_default(),
                date_modified: data.date_modified.clone(),
            }),
            PageType::Faq if !data.faqs.is_empty() => schema_generators::faq_page(&data.faqs),
            _ => web_page(),
        };

        let mut schemas = vec![self.organization_schema(), page_schema];
        if !data.breadcrumbs.is_empty() {
            schemas.push(schema_generators::breadcrumb_list(&data.breadcrumbs));
        }
        schema_generators::combine_schemas(&schemas)
    }

}

/// JSON objects usable from stored structured data. Raw JSON text is parsed;
/// arrays and `@graph` envelopes are flattened; anything that is not an
/// object is dropped.
fn custom_schema_objects(custom: &Value) -> Vec<Value> {
    let parsed;
    let custom = match custom {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(_) => return Vec::new(),
        },
        other => other,
    };
    let items: Vec<&Value> = match custom {
        Value::Array(items) => items.iter().collect(),
        Value::Object(object) if object.contains_key("@graph") => match object.get("@graph") {
            Some(Value::Array(graph)) => graph.iter().collect(),
            _ => Vec::new(),
        },
        object @ Value::Object(_) => vec![object],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter(|item| item.is_object())
        .cloned()
        .collect()
}

/// Wrap JSON-LD in a script tag, escaping `</` so the payload cannot close
/// the tag early.
pub fn json_ld_script(json_ld: &str) -> String {
    format!(
        r#"<script type="application/ld+json">{}</script>"#,
        json_ld.replace("</", "<\\/")
    )
}
