use opentelemetry_otlp::WithExportConfig;
use std::sync::Arc;
use tipi_core::SearchQueryBuilder;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod metrics;

use api::AppState;
use config::ServerConfig;

fn init_tracing(otlp: Option<&str>) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Some(endpoint) = otlp {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint),
            )
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .ok();
        if let Some(tracer) = tracer {
            let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
            let subscriber = tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer())
                .with(telemetry);
            tracing::subscriber::set_global_default(subscriber).ok();
            return;
        }
    }
    tracing_subscriber::fmt().with_env_filter(filter()).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = ServerConfig::from_env()?;
    init_tracing(cfg.otlp_endpoint.as_deref());
    metrics::register();

    let types = tipi_storage::type_manager(&cfg.country, cfg.taxonomy_file.as_deref())?;
    info!(country = types.country(), "initiative type manager ready");
    let groups = tipi_storage::group_directory(cfg.groups_file.clone(), cfg.groups.clone());
    let builder = SearchQueryBuilder::new(Arc::new(types), groups).with_config(cfg.builder);
    info!(accepted = ?builder.accepted_parameters(), "query builder ready");

    let app = api::router(AppState {
        builder: Arc::new(builder),
    });

    info!("http listening on {}", cfg.http_addr);
    let listener = tokio::net::TcpListener::bind(cfg.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
