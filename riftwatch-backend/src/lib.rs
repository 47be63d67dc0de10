pub mod config;
mod error;
pub mod helpers;
mod routes;
mod validation;

use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
};
use config::Config;
use riftwatch_proxy::ProxyService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ErrorResponse;

pub struct AppState {
    pub proxy: Arc<ProxyService>,
    pub diagnostics: Diagnostics,
}

/// Process facts reported by /api/debug. Never holds the key itself.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub api_key_length: usize,
    pub port: u16,
    pub environment: Option<String>,
}

impl Diagnostics {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key_length: helpers::key_length(config.riot_api_key.as_deref()),
            port: config.port,
            environment: config.environment.clone(),
        }
    }
}

/// Create the application router around the given proxy service
pub fn create_app(proxy: Arc<ProxyService>, config: &Config) -> Router {
    let state = Arc::new(AppState {
        proxy,
        diagnostics: Diagnostics::from_config(config),
    });

    // Per-IP limit on upstream-backed routes; the upstream API has its own quota
    let replenish_ms = (1000 / config.rate_limit_per_sec.max(1)).max(1);
    let api_governor = GovernorConfigBuilder::default()
        .per_millisecond(replenish_ms)
        .burst_size(config.rate_limit_burst.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("rate limit period and burst are non-zero");
    let api_limiter = GovernorLayer::new(api_governor).error_handler(error::rate_limited);

    let api_routes = Router::new()
        .route(
            "/profile/{region}/{gameName}/{tagLine}",
            get(routes::profile),
        )
        .route(
            "/account/{region}/{gameName}/{tagLine}",
            get(routes::account),
        )
        .route(
            "/account/puuid/{region}/{puuid}",
            get(routes::account_by_puuid),
        )
        .route(
            "/summoner/puuid/{region}/{puuid}",
            get(routes::summoner_by_puuid),
        )
        .route("/live/{region}/{summonerId}", get(routes::live_game))
        .route(
            "/matches/history/{region}/{puuid}",
            get(routes::match_history),
        )
        .route(
            "/matches/details/{region}/{matchId}",
            get(routes::match_details),
        )
        .route(
            "/matches/timeline/{region}/{matchId}",
            get(routes::match_timeline),
        )
        .route("/status/{region}", get(routes::platform_status))
        .route("/champions", get(routes::champions))
        .route(
            "/champions/{championName}",
            get(routes::champion_details),
        )
        .route("/items", get(routes::items))
        .route("/debug", get(routes::debug_info))
        .fallback(routes::api_not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .layer(api_limiter);

    Router::new()
        .route("/health", get(routes::health))
        .method_not_allowed_fallback(routes::method_not_allowed)
        .nest("/api", api_routes)
        .layer(RequestBodyLimitLayer::new(config.request_body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(middleware::map_response(error::timeout_as_json))
        .layer(cors_layer(&config.client_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop expired cache entries so idle keys don't accumulate
pub fn spawn_cache_sweeper(proxy: Arc<ProxyService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = proxy.cache().purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, remaining = proxy.cache().len(), "swept expired cache entries");
            }
        }
    })
}

fn cors_layer(client_url: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(client_url) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!(client_url, "CLIENT_URL is not a valid origin; CORS disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET])
}
