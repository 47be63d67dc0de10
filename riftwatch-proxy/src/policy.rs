//! Per-operation caching and routing policy.

use std::fmt;
use std::time::Duration;

/// Freshness class of a cached payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    /// Live data that changes within seconds.
    Short,
    /// Profile-style data that changes occasionally.
    Default,
    /// Platform health.
    Status,
    /// Immutable history.
    Long,
    /// Versioned reference data.
    Static,
}

/// Concrete durations for each TTL class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    pub short: Duration,
    pub default: Duration,
    pub status: Duration,
    pub long: Duration,
    pub static_data: Duration,
}

impl TtlPolicy {
    pub fn ttl(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Short => self.short,
            TtlClass::Default => self.default,
            TtlClass::Status => self.status,
            TtlClass::Long => self.long,
            TtlClass::Static => self.static_data,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(15),
            default: Duration::from_secs(30),
            status: Duration::from_secs(60),
            long: Duration::from_secs(300),
            static_data: Duration::from_secs(3600),
        }
    }
}

/// Which host family serves an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseClass {
    Platform,
    Continental,
    StaticData,
}

/// How an upstream 404 is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Surface `ProxyError::NotFound`.
    Error,
    /// Return `Ok(None)`; the resource legitimately may not exist right now.
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationPolicy {
    pub base: BaseClass,
    pub ttl: TtlClass,
    pub not_found: NotFoundPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AccountByRiotId,
    AccountByPuuid,
    SummonerByPuuid,
    CurrentGame,
    MatchIds,
    MatchDetail,
    MatchTimeline,
    PlatformStatus,
    StaticVersion,
    Champions,
    ChampionDetail,
    Items,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::AccountByRiotId => "account-by-riot-id",
            Operation::AccountByPuuid => "account-by-puuid",
            Operation::SummonerByPuuid => "summoner-by-puuid",
            Operation::CurrentGame => "current-game",
            Operation::MatchIds => "match-ids",
            Operation::MatchDetail => "match-detail",
            Operation::MatchTimeline => "match-timeline",
            Operation::PlatformStatus => "platform-status",
            Operation::StaticVersion => "static-version",
            Operation::Champions => "champions",
            Operation::ChampionDetail => "champion-detail",
            Operation::Items => "items",
        }
    }

    pub fn policy(self) -> OperationPolicy {
        use BaseClass::*;
        use NotFoundPolicy::Error;

        let (base, ttl, not_found) = match self {
            Operation::AccountByRiotId => (Continental, TtlClass::Default, Error),
            Operation::AccountByPuuid => (Continental, TtlClass::Default, Error),
            Operation::SummonerByPuuid => (Platform, TtlClass::Default, Error),
            Operation::CurrentGame => (Platform, TtlClass::Short, NotFoundPolicy::Absent),
            Operation::MatchIds => (Continental, TtlClass::Default, Error),
            Operation::MatchDetail => (Continental, TtlClass::Long, Error),
            Operation::MatchTimeline => (Continental, TtlClass::Long, Error),
            Operation::PlatformStatus => (Platform, TtlClass::Status, Error),
            Operation::StaticVersion
            | Operation::Champions
            | Operation::ChampionDetail
            | Operation::Items => (StaticData, TtlClass::Static, Error),
        };
        OperationPolicy {
            base,
            ttl,
            not_found,
        }
    }

    /// Deterministic cache key: operation name followed by its parameters.
    ///
    /// Each part is length-prefixed, so parts containing the separator cannot
    /// collide with a different split of the same text.
    pub fn cache_key(self, parts: &[&str]) -> String {
        let mut key = String::from(self.name());
        for part in parts {
            key.push_str(&format!("|{}:{part}", part.len()));
        }
        key
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
