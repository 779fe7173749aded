pub mod metadata_generator;
pub mod robots;
pub mod schema_generators;
pub mod seo_admin_api;
pub mod seo_scoring;
pub mod seo_validation;
pub mod sitemap;
