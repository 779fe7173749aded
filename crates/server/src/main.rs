use anyhow::Context;
use db::DBService;
use server::{
    AppState, app,
    config::{Config, log_filter},
};
use services::services::metadata_generator::MetadataGenerator;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::new(log_filter()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = DBService::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    info!(
        site_name = %config.site.site_name,
        site_url = %config.site.site_url,
        "Loaded site configuration"
    );

    let state = AppState::new(db, MetadataGenerator::new(config.site.clone()));
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!(addr = %listener.local_addr()?, "SEO admin API listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
