use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use riftwatch_backend::config::Config;
use riftwatch_backend::create_app;
use riftwatch_proxy::{ProxyService, Upstream, UpstreamError, UpstreamRequest};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
// for `oneshot` method

/// Upstream double: canned responses keyed by URL path, every call recorded
#[derive(Default)]
struct MockUpstream {
    responses: HashMap<String, Result<Value, UpstreamError>>,
    calls: Mutex<Vec<UpstreamRequest>>,
}

impl MockUpstream {
    fn respond(mut self, path: &str, response: Result<Value, UpstreamError>) -> Self {
        self.responses.insert(path.to_string(), response);
        self
    }

    fn calls(&self) -> Vec<UpstreamRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
        self.calls.lock().unwrap().push(request.clone());
        self.responses
            .get(request.url.path())
            .cloned()
            .unwrap_or(Err(UpstreamError::Status(500)))
    }
}

const ACCOUNT_PATH: &str = "/riot/account/v1/accounts/by-riot-id/nilejr/NA1";
const SUMMONER_PATH: &str = "/lol/summoner/v4/summoners/by-puuid/puuid-nilejr";
const LIVE_PATH: &str = "/lol/spectator/v4/active-games/by-summoner/summ-1";
const HISTORY_PATH: &str = "/lol/match/v5/matches/by-puuid/puuid-nilejr/ids";

fn player_upstream() -> MockUpstream {
    MockUpstream::default()
        .respond(
            ACCOUNT_PATH,
            Ok(json!({"puuid": "puuid-nilejr", "gameName": "nilejr", "tagLine": "NA1"})),
        )
        .respond(
            SUMMONER_PATH,
            Ok(json!({"id": "summ-1", "puuid": "puuid-nilejr", "summonerLevel": 187})),
        )
}

/// Helper to create app with default test configuration
fn create_test_app(upstream: &Arc<MockUpstream>) -> axum::Router {
    let config = Config::default();
    let proxy = Arc::new(ProxyService::new(upstream.clone()));
    create_app(proxy, &config)
}

/// Helper to send a GET request and get response
async fn send_request(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    send_request_with_method(app, "GET", uri).await
}

async fn send_request_with_method(app: axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    // Rate limiter keys on client IP
    let request = Request::builder()
        .uri(uri)
        .method(method)
        .header("X-Forwarded-For", "203.0.113.7")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    // Try to parse as JSON, or return empty object
    let json = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

// =============================================================================
// HEALTH AND DEBUG ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    // GIVEN: A running application
    let upstream = Arc::new(MockUpstream::default());
    let app = create_test_app(&upstream);

    // WHEN: Making a GET request to /health
    let (status, body) = send_request(app, "/health").await;

    // THEN: Should return 200 OK with a timestamp
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'), "timestamp: {timestamp}");
    assert!(timestamp.contains('T'), "timestamp: {timestamp}");
}

#[tokio::test]
async fn test_health_endpoint_with_post_method() {
    let upstream = Arc::new(MockUpstream::default());
    let app = create_test_app(&upstream);

    let (status, body) = send_request_with_method(app, "POST", "/health").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn test_wrong_method_on_api_route_returns_json_405() {
    // GIVEN: An existing GET-only lookup route
    let upstream = Arc::new(MockUpstream::default());
    let app = create_test_app(&upstream);

    // WHEN: Calling it with POST
    let (status, body) =
        send_request_with_method(app, "POST", "/api/matches/details/na1/NA1_1").await;

    // THEN: 405 in the standard error shape, without reaching upstream
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("POST"), "message: {message}");
    assert!(message.contains("/api/matches/details/na1/NA1_1"), "message: {message}");
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_rate_limited_client_gets_json_429() {
    // GIVEN: A tight per-IP limit
    let upstream = Arc::new(MockUpstream::default());
    let config = Config {
        rate_limit_per_sec: 1,
        rate_limit_burst: 2,
        ..Config::default()
    };
    let app = create_app(Arc::new(ProxyService::new(upstream.clone())), &config);

    // WHEN: The same client exceeds the burst
    let (first, _) = send_request(app.clone(), "/api/debug").await;
    let (second, _) = send_request(app.clone(), "/api/debug").await;
    let (third, body) = send_request(app.clone(), "/api/debug").await;

    // THEN: The overflow request is rejected in the standard error shape
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(third, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");
    assert!(body["message"].as_str().unwrap().contains("retry"));

    // /health is outside the limiter
    let (status, _) = send_request(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_debug_reports_key_presence_without_leaking_it() {
    // GIVEN: A configured API key
    let upstream = Arc::new(MockUpstream::default());
    let config = Config {
        riot_api_key: Some("RGAPI-0000".to_string()),
        environment: Some("production".to_string()),
        ..Config::default()
    };
    let app = create_app(Arc::new(ProxyService::new(upstream.clone())), &config);

    // WHEN: Requesting /api/debug
    let (status, body) = send_request(app, "/api/debug").await;

    // THEN: Only presence and length are reported
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasApiKey"], true);
    assert_eq!(body["apiKeyLength"], 10);
    assert_eq!(body["port"], 4000);
    assert_eq!(body["nodeEnv"], "production");
    assert!(!body.to_string().contains("RGAPI-0000"));
}

#[tokio::test]
async fn test_debug_without_key() {
    let upstream = Arc::new(MockUpstream::default());
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/debug").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasApiKey"], false);
    assert_eq!(body["apiKeyLength"], 0);
    assert_eq!(body["cachedEntries"], 0);
}

// =============================================================================
// PROFILE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_profile_success() {
    // GIVEN: Upstream knows nilejr#NA1
    let upstream = Arc::new(player_upstream());
    let app = create_test_app(&upstream);

    // WHEN: Requesting the profile
    let (status, body) = send_request(app, "/api/profile/na1/nilejr/NA1").await;

    // THEN: Account and summoner come back together
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["account"]["puuid"], "puuid-nilejr");
    assert_eq!(body["data"]["summoner"]["summonerLevel"], 187);

    // AND: Continental account lookup happened before platform summoner lookup
    let calls = upstream.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].url.host_str(), Some("americas.api.riotgames.com"));
    assert_eq!(calls[1].url.host_str(), Some("na1.api.riotgames.com"));
}

#[tokio::test]
async fn test_repeated_profile_is_served_from_cache() {
    // GIVEN: One app instance shared by two requests
    let upstream = Arc::new(player_upstream());
    let app = create_test_app(&upstream);

    // WHEN: The same profile is requested twice
    let (first, _) = send_request(app.clone(), "/api/profile/na1/nilejr/NA1").await;
    let (second, body) = send_request(app, "/api/profile/na1/nilejr/NA1").await;

    // THEN: The second request costs no upstream calls
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["data"]["account"]["gameName"], "nilejr");
    assert_eq!(upstream.calls().len(), 2);
}

#[tokio::test]
async fn test_profile_region_is_case_insensitive() {
    let upstream = Arc::new(player_upstream());
    let app = create_test_app(&upstream);

    let (status, _body) = send_request(app, "/api/profile/NA1/nilejr/NA1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(upstream.calls()[1].url.host_str(), Some("na1.api.riotgames.com"));
}

#[tokio::test]
async fn test_profile_with_unsupported_region() {
    // GIVEN: An account lookup that succeeds via the fallback continent
    let upstream = Arc::new(player_upstream());
    let app = create_test_app(&upstream);

    // WHEN: The region has no platform shard
    let (status, body) = send_request(app, "/api/profile/xx9/nilejr/NA1").await;

    // THEN: Summoner lookup fails hard with 400
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported region");
    assert!(body["message"].as_str().unwrap().contains("xx9"));
}

#[tokio::test]
async fn test_account_endpoint() {
    let upstream = Arc::new(player_upstream());
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/account/na1/nilejr/NA1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["puuid"], "puuid-nilejr");
    assert_eq!(upstream.calls().len(), 1);
}

#[tokio::test]
async fn test_account_by_puuid_endpoint() {
    let upstream = Arc::new(MockUpstream::default().respond(
        "/riot/account/v1/accounts/by-puuid/puuid-nilejr",
        Ok(json!({"puuid": "puuid-nilejr", "gameName": "nilejr"})),
    ));
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/account/puuid/euw1/puuid-nilejr").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gameName"], "nilejr");
    assert_eq!(
        upstream.calls()[0].url.host_str(),
        Some("europe.api.riotgames.com")
    );
}

#[tokio::test]
async fn test_summoner_by_puuid_endpoint() {
    let upstream = Arc::new(player_upstream());
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/summoner/puuid/na1/puuid-nilejr").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "summ-1");
}

// =============================================================================
// LIVE GAME ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_live_game_in_progress() {
    let upstream = Arc::new(
        MockUpstream::default().respond(LIVE_PATH, Ok(json!({"gameId": 5555, "gameMode": "CLASSIC"}))),
    );
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/live/na1/summ-1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["gameId"], 5555);
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_live_game_not_in_game_returns_null() {
    // GIVEN: Upstream answers 404 for the spectator lookup
    let upstream =
        Arc::new(MockUpstream::default().respond(LIVE_PATH, Err(UpstreamError::NotFound)));
    let app = create_test_app(&upstream);

    // WHEN: Checking live status
    let (status, body) = send_request(app, "/api/live/na1/summ-1").await;

    // THEN: Success with null data, not an error
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());
    assert_eq!(body["message"], "No active game found");
}

// =============================================================================
// MATCH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_match_history_pages_are_cached_separately() {
    // GIVEN: Upstream serving match ID pages
    let upstream = Arc::new(
        MockUpstream::default().respond(HISTORY_PATH, Ok(json!(["NA1_1", "NA1_2", "NA1_3"]))),
    );
    let app = create_test_app(&upstream);

    // WHEN: Requesting two different pages, then the first page again
    let (first, body) = send_request(
        app.clone(),
        "/api/matches/history/na1/puuid-nilejr?start=0&count=5",
    )
    .await;
    let (second, _) = send_request(
        app.clone(),
        "/api/matches/history/na1/puuid-nilejr?start=5&count=5",
    )
    .await;
    let (third, _) = send_request(app, "/api/matches/history/na1/puuid-nilejr?start=0&count=5").await;

    // THEN: Two distinct upstream calls, the repeat is cached
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(third, StatusCode::OK);
    assert_eq!(body["data"], json!(["NA1_1", "NA1_2", "NA1_3"]));

    let calls = upstream.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].query,
        vec![("start", "0".to_string()), ("count", "5".to_string())]
    );
    assert_eq!(
        calls[1].query,
        vec![("start", "5".to_string()), ("count", "5".to_string())]
    );
}

#[tokio::test]
async fn test_match_history_default_page() {
    let upstream = Arc::new(MockUpstream::default().respond(HISTORY_PATH, Ok(json!([]))));
    let app = create_test_app(&upstream);

    let (status, _body) = send_request(app, "/api/matches/history/na1/puuid-nilejr").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        upstream.calls()[0].query,
        vec![("start", "0".to_string()), ("count", "20".to_string())]
    );
}

#[tokio::test]
async fn test_match_history_rejects_bad_count() {
    let upstream = Arc::new(MockUpstream::default());
    let app = create_test_app(&upstream);

    let (status, body) =
        send_request(app, "/api/matches/history/na1/puuid-nilejr?count=500").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("count"));
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_match_details_success() {
    let upstream = Arc::new(MockUpstream::default().respond(
        "/lol/match/v5/matches/NA1_4987654321",
        Ok(json!({"metadata": {"matchId": "NA1_4987654321"}})),
    ));
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/matches/details/na1/NA1_4987654321").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metadata"]["matchId"], "NA1_4987654321");
}

#[tokio::test]
async fn test_match_timeline_success() {
    let upstream = Arc::new(MockUpstream::default().respond(
        "/lol/match/v5/matches/NA1_1/timeline",
        Ok(json!({"info": {"frames": []}})),
    ));
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/matches/timeline/na1/NA1_1").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["info"]["frames"].is_array());
}

// =============================================================================
// STATUS AND STATIC DATA ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_platform_status() {
    let upstream = Arc::new(MockUpstream::default().respond(
        "/lol/status/v4/platform-data",
        Ok(json!({"id": "NA1", "maintenances": [], "incidents": []})),
    ));
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/status/na1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "NA1");
}

fn static_upstream() -> MockUpstream {
    MockUpstream::default()
        .respond("/api/versions.json", Ok(json!(["15.12.1", "15.11.1"])))
        .respond(
            "/cdn/15.12.1/data/en_US/champion.json",
            Ok(json!({"data": {"Zed": {"key": "238"}, "Ahri": {"key": "103"}}})),
        )
        .respond(
            "/cdn/15.12.1/data/en_US/champion/Ahri.json",
            Ok(json!({"data": {"Ahri": {"title": "the Nine-Tailed Fox"}}})),
        )
        .respond(
            "/cdn/15.12.1/data/en_US/item.json",
            Ok(json!({"data": {"1001": {"name": "Boots"}}})),
        )
}

#[tokio::test]
async fn test_champions_list() {
    let upstream = Arc::new(static_upstream());
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/champions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], "15.12.1");
    assert_eq!(body["data"]["champions"], json!(["Ahri", "Zed"]));
    assert_eq!(body["data"]["championDetails"]["Zed"]["key"], "238");
    assert!(upstream.calls().iter().all(|call| !call.authenticated));
}

#[tokio::test]
async fn test_champion_details() {
    let upstream = Arc::new(static_upstream());
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app, "/api/champions/Ahri").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["Ahri"]["title"], "the Nine-Tailed Fox");
}

#[tokio::test]
async fn test_items() {
    let upstream = Arc::new(static_upstream());
    let app = create_test_app(&upstream);

    let (status, body) = send_request(app.clone(), "/api/items").await;
    let (again, _) = send_request(app, "/api/items").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, StatusCode::OK);
    assert_eq!(body["data"]["data"]["1001"]["name"], "Boots");
    // versions.json + item.json, then everything from cache
    assert_eq!(upstream.calls().len(), 2);
}
