use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;
use riftwatch_proxy::{
    Continent, DEFAULT_STATIC_DATA_URL, DEFAULT_UPSTREAM_HOST, TtlPolicy, UnknownRegionPolicy,
};

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    /// Env: PORT (default: 4000)
    pub port: u16,

    /// Upstream API credential
    /// Env: RIOT_API_KEY (optional; without it authenticated lookups fail with 403)
    pub riot_api_key: Option<String>,

    /// Origin allowed by CORS
    /// Env: CLIENT_URL (default: "http://localhost:5173")
    pub client_url: String,

    /// Deployment environment name, reported by /api/debug
    /// Env: APP_ENV (optional)
    pub environment: Option<String>,

    /// Request body size limit in bytes
    /// Env: REQUEST_BODY_LIMIT (default: 65536)
    pub request_body_limit: usize,

    /// Overall inbound request timeout
    /// Env: REQUEST_TIMEOUT_SECS (default: 30)
    pub request_timeout: Duration,

    /// Timeout for each upstream call
    /// Env: UPSTREAM_TIMEOUT_SECS (default: 10)
    pub upstream_timeout: Duration,

    /// Host suffix of the upstream API; shards and continents are subdomains
    /// Env: UPSTREAM_HOST (default: "api.riotgames.com")
    pub upstream_host: String,

    /// Base URL of the static game data CDN
    /// Env: STATIC_DATA_URL (default: "https://ddragon.leagueoflegends.com")
    pub static_data_url: String,

    /// Continental routing for unknown region codes
    /// Env: UNKNOWN_REGION_POLICY = "fallback" | "reject" (default: fallback)
    /// Env: FALLBACK_CONTINENT (default: americas)
    pub unknown_region_policy: UnknownRegionPolicy,

    /// Cache lifetimes per TTL class
    /// Env: CACHE_TTL_SHORT_SECS (15), CACHE_TTL_DEFAULT_SECS (30),
    /// CACHE_TTL_STATUS_SECS (60), CACHE_TTL_LONG_SECS (300), CACHE_TTL_STATIC_SECS (3600)
    pub cache_ttls: TtlPolicy,

    /// How often expired cache entries are swept
    /// Env: CACHE_SWEEP_INTERVAL_SECS (default: 60)
    pub cache_sweep_interval: Duration,

    /// Requests per second per client IP on /api routes
    /// Env: RATE_LIMIT_PER_SEC (default: 10)
    pub rate_limit_per_sec: u64,

    /// Burst size per client IP on /api routes
    /// Env: RATE_LIMIT_BURST (default: 20)
    pub rate_limit_burst: u32,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv(); //for local development mostly
        let defaults = Self::default();
        let ttls = &defaults.cache_ttls;
        Self {
            port: env_or_default("PORT", defaults.port),
            riot_api_key: var("RIOT_API_KEY").ok().filter(|key| !key.is_empty()),
            client_url: env_or_default_string("CLIENT_URL", &defaults.client_url),
            environment: var("APP_ENV").ok(),
            request_body_limit: env_or_default("REQUEST_BODY_LIMIT", defaults.request_body_limit),
            request_timeout: env_secs_or_default("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            upstream_timeout: env_secs_or_default(
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout,
            ),
            upstream_host: env_or_default_string("UPSTREAM_HOST", &defaults.upstream_host),
            static_data_url: env_or_default_string("STATIC_DATA_URL", &defaults.static_data_url),
            unknown_region_policy: parse_region_policy(
                var("UNKNOWN_REGION_POLICY").ok().as_deref(),
                var("FALLBACK_CONTINENT").ok().as_deref(),
            ),
            cache_ttls: TtlPolicy {
                short: env_secs_or_default("CACHE_TTL_SHORT_SECS", ttls.short),
                default: env_secs_or_default("CACHE_TTL_DEFAULT_SECS", ttls.default),
                status: env_secs_or_default("CACHE_TTL_STATUS_SECS", ttls.status),
                long: env_secs_or_default("CACHE_TTL_LONG_SECS", ttls.long),
                static_data: env_secs_or_default("CACHE_TTL_STATIC_SECS", ttls.static_data),
            },
            cache_sweep_interval: env_secs_or_default(
                "CACHE_SWEEP_INTERVAL_SECS",
                defaults.cache_sweep_interval,
            ),
            rate_limit_per_sec: env_or_default("RATE_LIMIT_PER_SEC", defaults.rate_limit_per_sec),
            rate_limit_burst: env_or_default("RATE_LIMIT_BURST", defaults.rate_limit_burst),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 4000,
            riot_api_key: None,
            client_url: "http://localhost:5173".to_string(),
            environment: None,
            request_body_limit: 64 * 1024,
            request_timeout: Duration::from_secs(30),
            upstream_timeout: Duration::from_secs(10),
            upstream_host: DEFAULT_UPSTREAM_HOST.to_string(),
            static_data_url: DEFAULT_STATIC_DATA_URL.to_string(),
            unknown_region_policy: UnknownRegionPolicy::default(),
            cache_ttls: TtlPolicy::default(),
            cache_sweep_interval: Duration::from_secs(60),
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
        }
    }
}

/// Interpret UNKNOWN_REGION_POLICY / FALLBACK_CONTINENT. Bad values keep the default.
fn parse_region_policy(policy: Option<&str>, continent: Option<&str>) -> UnknownRegionPolicy {
    let fallback = match continent.map(str::parse::<Continent>) {
        Some(Ok(continent)) => continent,
        Some(Err(err)) => {
            tracing::warn!("ignoring FALLBACK_CONTINENT: {err}");
            Continent::Americas
        }
        None => Continent::Americas,
    };

    match policy.map(str::to_ascii_lowercase).as_deref() {
        Some("reject") => UnknownRegionPolicy::Reject,
        Some("fallback") | None => UnknownRegionPolicy::Fallback(fallback),
        Some(other) => {
            tracing::warn!("unknown UNKNOWN_REGION_POLICY '{other}', using fallback");
            UnknownRegionPolicy::Fallback(fallback)
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}

fn env_secs_or_default(key: &str, default: Duration) -> Duration {
    Duration::from_secs(env_or_default(key, default.as_secs()))
}

/// Parse environment variable string or return default value
fn env_or_default_string(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| default.to_string())
}
