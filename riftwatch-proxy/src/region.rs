//! Region routing.
//!
//! Platform-scoped endpoints (summoner, live game, status) live on one host per
//! shard. Account and match endpoints live on one host per continent, shared by
//! several shards.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use crate::error::{ProxyError, Result};

pub const DEFAULT_UPSTREAM_HOST: &str = "api.riotgames.com";

/// A platform shard of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Na1,
    Br1,
    La1,
    La2,
    Euw1,
    Eun1,
    Tr1,
    Ru,
    Kr,
    Jp1,
    Oc1,
}

impl Platform {
    pub const ALL: [Platform; 11] = [
        Platform::Na1,
        Platform::Br1,
        Platform::La1,
        Platform::La2,
        Platform::Euw1,
        Platform::Eun1,
        Platform::Tr1,
        Platform::Ru,
        Platform::Kr,
        Platform::Jp1,
        Platform::Oc1,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Platform::Na1 => "na1",
            Platform::Br1 => "br1",
            Platform::La1 => "la1",
            Platform::La2 => "la2",
            Platform::Euw1 => "euw1",
            Platform::Eun1 => "eun1",
            Platform::Tr1 => "tr1",
            Platform::Ru => "ru",
            Platform::Kr => "kr",
            Platform::Jp1 => "jp1",
            Platform::Oc1 => "oc1",
        }
    }

    pub fn continent(self) -> Continent {
        match self {
            Platform::Na1 | Platform::Br1 | Platform::La1 | Platform::La2 => Continent::Americas,
            Platform::Euw1 | Platform::Eun1 | Platform::Tr1 | Platform::Ru => Continent::Europe,
            Platform::Kr | Platform::Jp1 | Platform::Oc1 => Continent::Asia,
        }
    }
}

impl FromStr for Platform {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        Platform::ALL
            .into_iter()
            .find(|p| p.code() == s)
            .ok_or_else(|| ProxyError::UnsupportedRegion(s.to_string()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A continental routing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continent {
    Americas,
    Europe,
    Asia,
}

impl Continent {
    pub fn code(self) -> &'static str {
        match self {
            Continent::Americas => "americas",
            Continent::Europe => "europe",
            Continent::Asia => "asia",
        }
    }
}

impl FromStr for Continent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "americas" => Ok(Continent::Americas),
            "europe" => Ok(Continent::Europe),
            "asia" => Ok(Continent::Asia),
            other => Err(format!("unknown continent '{other}'")),
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What continental routing does with a region code it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownRegionPolicy {
    /// Route to the given continent anyway.
    Fallback(Continent),
    /// Fail with `UnsupportedRegion`, same as platform routing.
    Reject,
}

impl Default for UnknownRegionPolicy {
    fn default() -> Self {
        UnknownRegionPolicy::Fallback(Continent::Americas)
    }
}

#[derive(Debug, Clone)]
pub struct RegionRouter {
    host: String,
    unknown_region: UnknownRegionPolicy,
}

impl RegionRouter {
    pub fn new(host: impl Into<String>, unknown_region: UnknownRegionPolicy) -> Self {
        Self {
            host: host.into(),
            unknown_region,
        }
    }

    pub fn unknown_region_policy(&self) -> UnknownRegionPolicy {
        self.unknown_region
    }

    /// Base URL of the shard serving `region`. Unknown codes are a hard error.
    pub fn platform_base(&self, region: &str) -> Result<Url> {
        let platform: Platform = region.parse()?;
        self.base_for(platform.code())
    }

    /// Base URL of the continental host serving `region`.
    pub fn continental_base(&self, region: &str) -> Result<Url> {
        let continent = match region.parse::<Platform>() {
            Ok(platform) => platform.continent(),
            Err(err) => match self.unknown_region {
                UnknownRegionPolicy::Fallback(continent) => {
                    tracing::debug!(region, %continent, "unknown region, using fallback continent");
                    continent
                }
                UnknownRegionPolicy::Reject => return Err(err),
            },
        };
        self.base_for(continent.code())
    }

    fn base_for(&self, subdomain: &str) -> Result<Url> {
        let raw = format!("https://{subdomain}.{}", self.host);
        Url::parse(&raw).map_err(|e| ProxyError::Upstream(format!("invalid base url {raw}: {e}")))
    }
}

impl Default for RegionRouter {
    fn default() -> Self {
        Self::new(DEFAULT_UPSTREAM_HOST, UnknownRegionPolicy::default())
    }
}
