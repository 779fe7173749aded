//! Schema.org JSON-LD builders.
//!
//! Every builder is a pure function from a config struct to a fresh
//! `serde_json::Value` that carries `@context` and `@type`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ts_rs::TS;

pub const SCHEMA_CONTEXT: &str = "https://schema.org";

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct OrganizationSchemaConfig {
    pub name: String,
    pub url: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub same_as: Vec<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct WebPageSchemaConfig {
    pub name: String,
    pub description: String,
    pub url: String,
    pub in_language: Option<String>,
    pub date_modified: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct ArticleSchemaConfig {
    pub headline: String,
    pub description: String,
    pub url: String,
    pub image: Option<String>,
    pub author_name: String,
    pub author_url: Option<String>,
    pub publisher_name: String,
    pub publisher_logo: Option<String>,
    pub date_published: String,
    pub date_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct BreadcrumbItem {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
pub struct AggregateRating {
    pub rating_value: f32,
    pub rating_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct SoftwareApplicationSchemaConfig {
    pub name: String,
    pub description: String,
    pub url: String,
    pub application_category: Option<String>,
    pub operating_system: Option<String>,
    pub price: Option<String>,
    pub price_currency: Option<String>,
    pub rating: Option<AggregateRating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct HowToStep {
    pub name: String,
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct HowToSchemaConfig {
    pub name: String,
    pub description: String,
    pub total_time: Option<String>,
    pub steps: Vec<HowToStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct ProductSchemaConfig {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub price: Option<String>,
    pub price_currency: Option<String>,
    pub availability: Option<String>,
    pub rating: Option<AggregateRating>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct PersonSchemaConfig {
    pub name: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub job_title: Option<String>,
    #[serde(default)]
    pub same_as: Vec<String>,
}

fn set_opt(target: &mut Value, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        target[key] = value;
    }
}

fn rating_schema(rating: &AggregateRating) -> Value {
    json!({
        "@type": "AggregateRating",
        "ratingValue": rating.rating_value,
        "ratingCount": rating.rating_count,
    })
}

pub fn organization(config: &OrganizationSchemaConfig) -> Value {
    let mut schema = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Organization",
        "name": config.name,
        "url": config.url,
    });
    set_opt(
        &mut schema,
        "logo",
        config
            .logo
            .as_ref()
            .map(|logo| json!({ "@type": "ImageObject", "url": logo })),
    );
    set_opt(&mut schema, "description", config.description.as_ref().map(|d| json!(d)));
    if !config.same_as.is_empty() {
        schema["sameAs"] = json!(config.same_as);
    }
    if config.contact_email.is_some() || config.contact_phone.is_some() {
        let mut contact = json!({
            "@type": "ContactPoint",
            "contactType": "customer support",
        });
        set_opt(&mut contact, "email", config.contact_email.as_ref().map(|e| json!(e)));
        set_opt(&mut contact, "telephone", config.contact_phone.as_ref().map(|p| json!(p)));
        schema["contactPoint"] = contact;
    }
    schema
}

pub fn web_page(config: &WebPageSchemaConfig) -> Value {
    let mut schema = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "WebPage",
        "name": config.name,
        "description": config.description,
        "url": config.url,
    });
    set_opt(&mut schema, "inLanguage", config.in_language.as_ref().map(|l| json!(l)));
    set_opt(&mut schema, "dateModified", config.date_modified.as_ref().map(|d| json!(d)));
    schema
}

pub fn article(config: &ArticleSchemaConfig) -> Value {
    let mut author = json!({ "@type": "Person", "name": config.author_name });
    set_opt(&mut author, "url", config.author_url.as_ref().map(|u| json!(u)));

    let mut publisher = json!({ "@type": "Organization", "name": config.publisher_name });
    set_opt(
        &mut publisher,
        "logo",
        config
            .publisher_logo
            .as_ref()
            .map(|logo| json!({ "@type": "ImageObject", "url": logo })),
    );

    let mut schema = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Article",
        "headline": config.headline,
        "description": config.description,
        "author": author,
        "publisher": publisher,
        "datePublished": config.date_published,
        // Unmodified articles report their publish date
        "dateModified": config.date_modified.as_deref().unwrap_or(&config.date_published),
        "mainEntityOfPage": { "@type": "WebPage", "@id": config.url },
    });
    set_opt(&mut schema, "image", config.image.as_ref().map(|i| json!(i)));
    schema
}

pub fn faq_page(items: &[FaqItem]) -> Value {
    let questions: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "@type": "Question",
                "name": item.question,
                "acceptedAnswer": { "@type": "Answer", "text": item.answer },
            })
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "FAQPage",
        "mainEntity": questions,
    })
}

pub fn breadcrumb_list(items: &[BreadcrumbItem]) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": item.name,
                "item": item.url,
            })
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    })
}

pub fn software_application(config: &SoftwareApplicationSchemaConfig) -> Value {
    let mut schema = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "SoftwareApplication",
        "name": config.name,
        "description": config.description,
        "url": config.url,
        "applicationCategory": config.application_category.as_deref().unwrap_or("UtilitiesApplication"),
        "operatingSystem": config.operating_system.as_deref().unwrap_or("Web"),
        "offers": {
            "@type": "Offer",
            "price": config.price.as_deref().unwrap_or("0"),
            "priceCurrency": config.price_currency.as_deref().unwrap_or("USD"),
        },
    });
    set_opt(&mut schema, "aggregateRating", config.rating.as_ref().map(rating_schema));
    schema
}

pub fn how_to(config: &HowToSchemaConfig) -> Value {
    let steps: Vec<Value> = config
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let mut value = json!({
                "@type": "HowToStep",
                "position": i + 1,
                "name": step.name,
                "text": step.text,
            });
            set_opt(&mut value, "image", step.image.as_ref().map(|img| json!(img)));
            value
        })
        .collect();
    let mut schema = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "HowTo",
        "name": config.name,
        "description": config.description,
        "step": steps,
    });
    set_opt(&mut schema, "totalTime", config.total_time.as_ref().map(|t| json!(t)));
    schema
}

pub fn product(config: &ProductSchemaConfig) -> Value {
    let mut schema = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Product",
        "name": config.name,
        "description": config.description,
    });
    set_opt(&mut schema, "image", config.image.as_ref().map(|i| json!(i)));
    set_opt(
        &mut schema,
        "brand",
        config.brand.as_ref().map(|b| json!({ "@type": "Brand", "name": b })),
    );
    set_opt(&mut schema, "sku", config.sku.as_ref().map(|s| json!(s)));
    if let Some(price) = &config.price {
        schema["offers"] = json!({
            "@type": "Offer",
            "price": price,
            "priceCurrency": config.price_currency.as_deref().unwrap_or("USD"),
            "availability": config
                .availability
                .as_deref()
                .unwrap_or("https://schema.org/InStock"),
        });
    }
    set_opt(&mut schema, "aggregateRating", config.rating.as_ref().map(rating_schema));
    schema
}

pub fn person(config: &PersonSchemaConfig) -> Value {
    let mut schema = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Person",
        "name": config.name,
    });
    set_opt(&mut schema, "url", config.url.as_ref().map(|u| json!(u)));
    set_opt(&mut schema, "image", config.image.as_ref().map(|i| json!(i)));
    set_opt(&mut schema, "jobTitle", config.job_title.as_ref().map(|j| json!(j)));
    if !config.same_as.is_empty() {
        schema["sameAs"] = json!(config.same_as);
    }
    schema
}

/// Serialize schemas for a single JSON-LD payload.
///
/// Exactly one schema is emitted as-is. Any other count is wrapped in an
/// `@graph` envelope whose elements are left unchanged.
pub fn combine_schemas(schemas: &[Value]) -> String {
    match schemas {
        [single] => single.to_string(),
        many => json!({
            "@context": SCHEMA_CONTEXT,
            "@graph": many,
        })
        .to_string(),
    }
}
