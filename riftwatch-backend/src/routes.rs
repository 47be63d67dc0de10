use crate::AppState;
use crate::error::{AppError, ErrorResponse, Lookup};
use crate::helpers::timestamp;
use crate::validation;

use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
};
use axum_macros::debug_handler;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Success envelope shared by every lookup route.
#[derive(Serialize)]
pub(crate) struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: None,
        })
    }
}

#[derive(Deserialize)]
pub(crate) struct RiotIdPath {
    region: String,
    #[serde(rename = "gameName")]
    game_name: String,
    #[serde(rename = "tagLine")]
    tag_line: String,
}

#[derive(Deserialize)]
pub(crate) struct PuuidPath {
    region: String,
    puuid: String,
}

#[derive(Deserialize)]
pub(crate) struct LivePath {
    region: String,
    #[serde(rename = "summonerId")]
    summoner_id: String,
}

#[derive(Deserialize)]
pub(crate) struct MatchPath {
    region: String,
    #[serde(rename = "matchId")]
    match_id: String,
}

#[derive(Deserialize)]
pub(crate) struct HistoryQuery {
    start: Option<String>,
    count: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DebugResponse {
    has_api_key: bool,
    api_key_length: usize,
    port: u16,
    node_env: Option<String>,
    cached_entries: usize,
}

fn riot_id_subject(game_name: &str, tag_line: &str, region: &str) -> String {
    format!("Riot ID \"{game_name}#{tag_line}\" in region \"{region}\"")
}

#[debug_handler]
pub(crate) async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK",
        timestamp: timestamp(),
    })
}

#[debug_handler]
pub(crate) async fn debug_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let diagnostics = &state.diagnostics;
    Json(DebugResponse {
        has_api_key: diagnostics.api_key_length > 0,
        api_key_length: diagnostics.api_key_length,
        port: diagnostics.port,
        node_env: diagnostics.environment.clone(),
        cached_entries: state.proxy.cache().len(),
    })
}

#[debug_handler]
pub(crate) async fn profile(
    State(state): State<Arc<AppState>>,
    Path(path): Path<RiotIdPath>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&path.region)?;
    validation::validate_game_name(&path.game_name)?;
    validation::validate_tag_line(&path.tag_line)?;
    tracing::info!(%region, game_name = %path.game_name, tag_line = %path.tag_line, "profile lookup");

    let profile = state
        .proxy
        .profile(&region, &path.game_name, &path.tag_line)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "profile data",
                    "Profile not found",
                    format!(
                        "No profile found with {}",
                        riot_id_subject(&path.game_name, &path.tag_line, &region)
                    ),
                ),
            )
        })?;

    Ok(ApiResponse::ok(profile))
}

#[debug_handler]
pub(crate) async fn account(
    State(state): State<Arc<AppState>>,
    Path(path): Path<RiotIdPath>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&path.region)?;
    validation::validate_game_name(&path.game_name)?;
    validation::validate_tag_line(&path.tag_line)?;

    let account = state
        .proxy
        .account_by_riot_id(&region, &path.game_name, &path.tag_line)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "account data",
                    "Account not found",
                    format!(
                        "No account found with {}",
                        riot_id_subject(&path.game_name, &path.tag_line, &region)
                    ),
                ),
            )
        })?;

    Ok(ApiResponse::ok(account))
}

#[debug_handler]
pub(crate) async fn account_by_puuid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<PuuidPath>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&path.region)?;
    validation::validate_identifier("puuid", &path.puuid)?;

    let account = state
        .proxy
        .account_by_puuid(&region, &path.puuid)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "account data",
                    "Account not found",
                    format!(
                        "No account found with PUUID \"{}\" in region \"{region}\"",
                        path.puuid
                    ),
                ),
            )
        })?;

    Ok(ApiResponse::ok(account))
}

#[debug_handler]
pub(crate) async fn summoner_by_puuid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<PuuidPath>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&path.region)?;
    validation::validate_identifier("puuid", &path.puuid)?;

    let summoner = state
        .proxy
        .summoner_by_puuid(&region, &path.puuid)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "summoner data",
                    "Summoner not found",
                    format!(
                        "No summoner found with PUUID \"{}\" in region \"{region}\"",
                        path.puuid
                    ),
                ),
            )
        })?;

    Ok(ApiResponse::ok(summoner))
}

#[debug_handler]
pub(crate) async fn live_game(
    State(state): State<Arc<AppState>>,
    Path(path): Path<LivePath>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&path.region)?;
    validation::validate_identifier("summonerId", &path.summoner_id)?;

    let game = state
        .proxy
        .current_game(&region, &path.summoner_id)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "live game data",
                    "Summoner not found",
                    format!(
                        "No summoner found with ID \"{}\" in region \"{region}\"",
                        path.summoner_id
                    ),
                ),
            )
        })?;

    let message = game.is_none().then_some("No active game found");
    Ok(Json(ApiResponse {
        success: true,
        data: game,
        message,
    }))
}

#[debug_handler]
pub(crate) async fn match_history(
    State(state): State<Arc<AppState>>,
    Path(path): Path<PuuidPath>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&path.region)?;
    validation::validate_identifier("puuid", &path.puuid)?;
    let page = validation::parse_match_page(query.start.as_deref(), query.count.as_deref())?;

    let ids = state
        .proxy
        .match_ids(&region, &path.puuid, page)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "match history",
                    "Match history not found",
                    format!(
                        "No match history found for PUUID \"{}\" in region \"{region}\"",
                        path.puuid
                    ),
                ),
            )
        })?;

    Ok(ApiResponse::ok(ids))
}

#[debug_handler]
pub(crate) async fn match_details(
    State(state): State<Arc<AppState>>,
    Path(path): Path<MatchPath>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&path.region)?;
    validation::validate_identifier("matchId", &path.match_id)?;

    let detail = state
        .proxy
        .match_detail(&region, &path.match_id)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "match details",
                    "Match not found",
                    format!("No match found with ID \"{}\"", path.match_id),
                ),
            )
        })?;

    Ok(ApiResponse::ok(detail))
}

#[debug_handler]
pub(crate) async fn match_timeline(
    State(state): State<Arc<AppState>>,
    Path(path): Path<MatchPath>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&path.region)?;
    validation::validate_identifier("matchId", &path.match_id)?;

    let timeline = state
        .proxy
        .match_timeline(&region, &path.match_id)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "match timeline",
                    "Match timeline not found",
                    format!("No timeline found for match ID \"{}\"", path.match_id),
                ),
            )
        })?;

    Ok(ApiResponse::ok(timeline))
}

#[debug_handler]
pub(crate) async fn platform_status(
    State(state): State<Arc<AppState>>,
    Path(region): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let region = validation::validate_region(&region)?;

    let status = state.proxy.platform_status(&region).await.map_err(|e| {
        AppError::lookup(
            e,
            Lookup::new(
                "platform status",
                "Platform status not found",
                format!("No status available for region \"{region}\""),
            ),
        )
    })?;

    Ok(ApiResponse::ok(status))
}

#[debug_handler]
pub(crate) async fn champions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = state.proxy.champions().await.map_err(|e| {
        AppError::lookup(
            e,
            Lookup::new(
                "champions data",
                "Champion data not found",
                "Champion list is unavailable",
            ),
        )
    })?;

    Ok(ApiResponse::ok(catalog))
}

#[debug_handler]
pub(crate) async fn champion_details(
    State(state): State<Arc<AppState>>,
    Path(champion_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_identifier("championName", &champion_name)?;

    let detail = state
        .proxy
        .champion_detail(&champion_name)
        .await
        .map_err(|e| {
            AppError::lookup(
                e,
                Lookup::new(
                    "champion details",
                    "Champion not found",
                    format!("Champion \"{champion_name}\" does not exist"),
                ),
            )
        })?;

    Ok(ApiResponse::ok(detail))
}

#[debug_handler]
pub(crate) async fn items(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let items = state.proxy.items().await.map_err(|e| {
        AppError::lookup(
            e,
            Lookup::new("items data", "Item data not found", "Item list is unavailable"),
        )
    })?;

    Ok(ApiResponse::ok(items))
}

#[debug_handler]
pub(crate) async fn api_not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "API endpoint not found",
            format!("No endpoint matches {}", uri.path()),
        )),
    )
}

#[debug_handler]
pub(crate) async fn method_not_allowed(
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new(
            "Method not allowed",
            format!("{method} is not supported on {}", uri.path()),
        )),
    )
}
