use anyhow::Context;
use riftwatch_backend::config::Config;
use riftwatch_backend::{create_app, spawn_cache_sweeper};
use riftwatch_proxy::{HttpUpstream, ProxyService, RegionRouter, Url};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for structured logging; RUST_LOG overrides the level
    #[cfg(debug_assertions)]
    let log_level = "debug";
    #[cfg(not(debug_assertions))]
    let log_level = "info";

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting Riftwatch backend server...");

    let config = Config::from_env();
    tracing::info!(
        "Configuration: port={}, api_key={}, client_url={}, timeout={}s, upstream_timeout={}s, upstream_host={}",
        config.port,
        if config.riot_api_key.is_some() { "configured" } else { "missing" },
        config.client_url,
        config.request_timeout.as_secs(),
        config.upstream_timeout.as_secs(),
        config.upstream_host
    );
    tracing::info!(
        "Cache TTLs: short={}s, default={}s, status={}s, long={}s, static={}s; unknown regions: {:?}",
        config.cache_ttls.short.as_secs(),
        config.cache_ttls.default.as_secs(),
        config.cache_ttls.status.as_secs(),
        config.cache_ttls.long.as_secs(),
        config.cache_ttls.static_data.as_secs(),
        config.unknown_region_policy
    );

    let proxy = Arc::new(build_proxy(&config)?);
    let sweeper = spawn_cache_sweeper(proxy.clone(), config.cache_sweep_interval);
    let app = create_app(proxy, &config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    sweeper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

fn build_proxy(config: &Config) -> anyhow::Result<ProxyService> {
    let upstream = HttpUpstream::new(config.riot_api_key.as_deref(), config.upstream_timeout)
        .context("failed to build upstream client")?;
    let static_data_url = Url::parse(&config.static_data_url)
        .with_context(|| format!("invalid STATIC_DATA_URL {}", config.static_data_url))?;

    let proxy = ProxyService::new(Arc::new(upstream))
        .with_router(RegionRouter::new(
            config.upstream_host.clone(),
            config.unknown_region_policy,
        ))
        .with_ttls(config.cache_ttls.clone())
        .with_static_data_url(static_data_url);
    Ok(proxy)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
