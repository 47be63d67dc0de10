use serde::Serialize;
use serde_json::Value;

/// Account and summoner payloads for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub account: Value,
    pub summoner: Value,
}

/// Champion list reshaped for the client: names sorted, full data alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionCatalog {
    pub version: String,
    pub champions: Vec<String>,
    pub champion_details: Value,
}

/// Pagination window over a player's match IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPage {
    pub start: u32,
    pub count: u32,
}

impl MatchPage {
    pub const DEFAULT_COUNT: u32 = 20;
    pub const MAX_COUNT: u32 = 100;

    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }
}

impl Default for MatchPage {
    fn default() -> Self {
        Self {
            start: 0,
            count: Self::DEFAULT_COUNT,
        }
    }
}
