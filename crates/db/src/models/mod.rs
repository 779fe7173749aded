pub mod robots;
pub mod seo_metadata;
pub mod sitemap;
