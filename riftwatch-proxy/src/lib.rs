mod cache;
mod error;
mod models;
mod policy;
mod region;
mod upstream;

pub use cache::{DEFAULT_TTL, ExpiringCache};
pub use error::{ProxyError, Result, UpstreamError};
pub use models::{ChampionCatalog, MatchPage, Profile};
pub use policy::{BaseClass, NotFoundPolicy, Operation, OperationPolicy, TtlClass, TtlPolicy};
pub use region::{Continent, DEFAULT_UPSTREAM_HOST, Platform, RegionRouter, UnknownRegionPolicy};
pub use upstream::{
    DEFAULT_TIMEOUT, HttpUpstream, TOKEN_HEADER, Upstream, UpstreamRequest, classify_status,
};

pub use reqwest::Url;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_STATIC_DATA_URL: &str = "https://ddragon.leagueoflegends.com";

/// Read-through caching proxy over the upstream game-data API.
pub struct ProxyService {
    upstream: Arc<dyn Upstream>,
    router: RegionRouter,
    cache: ExpiringCache<Value>,
    ttls: TtlPolicy,
    static_data_url: Url,
}

impl ProxyService {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        let ttls = TtlPolicy::default();
        Self {
            upstream,
            router: RegionRouter::default(),
            cache: ExpiringCache::with_default_ttl(ttls.default),
            ttls,
            static_data_url: Url::parse(DEFAULT_STATIC_DATA_URL)
                .expect("default static data url is valid"),
        }
    }

    pub fn with_router(mut self, router: RegionRouter) -> Self {
        self.router = router;
        self
    }

    pub fn with_ttls(mut self, ttls: TtlPolicy) -> Self {
        self.cache = ExpiringCache::with_default_ttl(ttls.default);
        self.ttls = ttls;
        self
    }

    pub fn with_static_data_url(mut self, url: Url) -> Self {
        self.static_data_url = url;
        self
    }

    pub fn cache(&self) -> &ExpiringCache<Value> {
        &self.cache
    }

    pub fn router(&self) -> &RegionRouter {
        &self.router
    }

    pub async fn account_by_riot_id(
        &self,
        region: &str,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Value> {
        let key = Operation::AccountByRiotId.cache_key(&[region, game_name, tag_line]);
        self.read_through(Operation::AccountByRiotId, Some(region), key, |base| {
            UpstreamRequest::new(
                base,
                ["riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line],
            )
        })
        .await
        .and_then(present)
    }

    pub async fn account_by_puuid(&self, region: &str, puuid: &str) -> Result<Value> {
        let key = Operation::AccountByPuuid.cache_key(&[region, puuid]);
        self.read_through(Operation::AccountByPuuid, Some(region), key, |base| {
            UpstreamRequest::new(base, ["riot", "account", "v1", "accounts", "by-puuid", puuid])
        })
        .await
        .and_then(present)
    }

    pub async fn summoner_by_puuid(&self, region: &str, puuid: &str) -> Result<Value> {
        let key = Operation::SummonerByPuuid.cache_key(&[region, puuid]);
        self.read_through(Operation::SummonerByPuuid, Some(region), key, |base| {
            UpstreamRequest::new(base, ["lol", "summoner", "v4", "summoners", "by-puuid", puuid])
        })
        .await
        .and_then(present)
    }

    /// Active game of a summoner. `None` means the player is not in a game.
    pub async fn current_game(&self, region: &str, summoner_id: &str) -> Result<Option<Value>> {
        let key = Operation::CurrentGame.cache_key(&[region, summoner_id]);
        self.read_through(Operation::CurrentGame, Some(region), key, |base| {
            UpstreamRequest::new(
                base,
                ["lol", "spectator", "v4", "active-games", "by-summoner", summoner_id],
            )
        })
        .await
    }

    /// One page of match IDs, newest first.
    pub async fn match_ids(&self, region: &str, puuid: &str, page: MatchPage) -> Result<Value> {
        let start = page.start.to_string();
        let count = page.count.to_string();
        let key = Operation::MatchIds.cache_key(&[region, puuid, &start, &count]);
        self.read_through(Operation::MatchIds, Some(region), key, |base| {
            Ok(
                UpstreamRequest::new(base, ["lol", "match", "v5", "matches", "by-puuid", puuid, "ids"])?
                    .query("start", page.start)
                    .query("count", page.count),
            )
        })
        .await
        .and_then(present)
    }

    pub async fn match_detail(&self, region: &str, match_id: &str) -> Result<Value> {
        let key = Operation::MatchDetail.cache_key(&[region, match_id]);
        self.read_through(Operation::MatchDetail, Some(region), key, |base| {
            UpstreamRequest::new(base, ["lol", "match", "v5", "matches", match_id])
        })
        .await
        .and_then(present)
    }

    pub async fn match_timeline(&self, region: &str, match_id: &str) -> Result<Value> {
        let key = Operation::MatchTimeline.cache_key(&[region, match_id]);
        self.read_through(Operation::MatchTimeline, Some(region), key, |base| {
            UpstreamRequest::new(base, ["lol", "match", "v5", "matches", match_id, "timeline"])
        })
        .await
        .and_then(present)
    }

    pub async fn platform_status(&self, region: &str) -> Result<Value> {
        let key = Operation::PlatformStatus.cache_key(&[region]);
        self.read_through(Operation::PlatformStatus, Some(region), key, |base| {
            UpstreamRequest::new(base, ["lol", "status", "v4", "platform-data"])
        })
        .await
        .and_then(present)
    }

    /// Account by Riot ID, then summoner by the account's PUUID.
    pub async fn profile(&self, region: &str, game_name: &str, tag_line: &str) -> Result<Profile> {
        let account = self.account_by_riot_id(region, game_name, tag_line).await?;
        let puuid = account
            .get("puuid")
            .and_then(Value::as_str)
            .ok_or_else(|| ProxyError::MalformedResponse("account has no puuid".to_string()))?
            .to_string();
        let summoner = self.summoner_by_puuid(region, &puuid).await?;
        Ok(Profile { account, summoner })
    }

    /// Latest published static data version.
    pub async fn static_version(&self) -> Result<String> {
        let key = Operation::StaticVersion.cache_key(&[]);
        let versions = self
            .read_through(Operation::StaticVersion, None, key, |base| {
                UpstreamRequest::new(base, ["api", "versions.json"])
            })
            .await
            .and_then(present)?;

        versions
            .get(0)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProxyError::MalformedResponse("empty version list".to_string()))
    }

    pub async fn champions(&self) -> Result<ChampionCatalog> {
        let version = self.static_version().await?;
        let key = Operation::Champions.cache_key(&[&version]);
        let payload = self
            .read_through(Operation::Champions, None, key, |base| {
                UpstreamRequest::new(base, ["cdn", version.as_str(), "data", "en_US", "champion.json"])
            })
            .await
            .and_then(present)?;

        let champion_details = payload
            .get("data")
            .cloned()
            .ok_or_else(|| ProxyError::MalformedResponse("champion list has no data".to_string()))?;
        let mut champions: Vec<String> = champion_details
            .as_object()
            .map(|data| data.keys().cloned().collect())
            .unwrap_or_default();
        champions.sort();

        Ok(ChampionCatalog {
            version,
            champions,
            champion_details,
        })
    }

    pub async fn champion_detail(&self, name: &str) -> Result<Value> {
        let version = self.static_version().await?;
        let file = format!("{name}.json");
        let key = Operation::ChampionDetail.cache_key(&[&version, name]);
        self.read_through(Operation::ChampionDetail, None, key, |base| {
            UpstreamRequest::new(base, ["cdn", version.as_str(), "data", "en_US", "champion", file.as_str()])
        })
        .await
        .and_then(present)
    }

    pub async fn items(&self) -> Result<Value> {
        let version = self.static_version().await?;
        let key = Operation::Items.cache_key(&[&version]);
        self.read_through(Operation::Items, None, key, |base| {
            UpstreamRequest::new(base, ["cdn", version.as_str(), "data", "en_US", "item.json"])
        })
        .await
        .and_then(present)
    }

    /// Serve `key` from cache, or resolve the base URL, fetch and store.
    ///
    /// `Ok(None)` only occurs for operations whose 404 policy is `Absent`.
    /// Failures and absent results are never cached.
    async fn read_through<F>(
        &self,
        op: Operation,
        region: Option<&str>,
        key: String,
        build: F,
    ) -> Result<Option<Value>>
    where
        F: FnOnce(Url) -> std::result::Result<UpstreamRequest, UpstreamError>,
    {
        if let Some(hit) = self.cache.get(&key).await {
            debug!(operation = %op, key, "cache hit");
            return Ok(Some(hit));
        }

        let policy = op.policy();
        let base = self.base_url(policy.base, region)?;
        let mut request = build(base)?;
        if policy.base == BaseClass::StaticData {
            request = request.unauthenticated();
        }

        debug!(operation = %op, key, "cache miss");
        match self.upstream.fetch(&request).await {
            Ok(value) => {
                self.cache
                    .set_with_ttl(key, value.clone(), self.ttls.ttl(policy.ttl))
                    .await;
                Ok(Some(value))
            }
            Err(UpstreamError::NotFound) if policy.not_found == NotFoundPolicy::Absent => {
                debug!(operation = %op, key, "upstream 404 treated as absent");
                Ok(None)
            }
            Err(err) => {
                warn!(operation = %op, key, error = %err, "upstream lookup failed");
                Err(err.into())
            }
        }
    }

    fn base_url(&self, base: BaseClass, region: Option<&str>) -> Result<Url> {
        match (base, region) {
            (BaseClass::StaticData, _) => Ok(self.static_data_url.clone()),
            (BaseClass::Platform, Some(region)) => self.router.platform_base(region),
            (BaseClass::Continental, Some(region)) => self.router.continental_base(region),
            (_, None) => Err(ProxyError::UnsupportedRegion(String::new())),
        }
    }
}

fn present(value: Option<Value>) -> Result<Value> {
    value.ok_or(ProxyError::NotFound)
}
