use crate::error::StatsError;
use crate::models::{AggregateSummary, AnnotatedGame, LineQuery, LineResult, PlayerId, Season};
use crate::utils::aggregator::aggregate;
use crate::utils::annotator::annotate;
use crate::utils::fetcher::StatLogFetcher;
use crate::utils::line_evaluator::evaluate;
use crate::utils::player_directory::{PlayerDirectory, RosterSource};
use crate::utils::seasons::generate_seasons;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, Request, State,
    },
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Player directory shared by all requests; replaced whole on refresh
pub type SharedDirectory = Arc<RwLock<Arc<PlayerDirectory>>>;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: StatLogFetcher,
    pub directory: SharedDirectory,
    pub roster: Arc<dyn RosterSource>,
}

impl AppState {
    pub fn new(fetcher: StatLogFetcher, directory: PlayerDirectory, roster: Arc<dyn RosterSource>) -> Self {
        Self {
            fetcher,
            directory: Arc::new(RwLock::new(Arc::new(directory))),
            roster,
        }
    }

    async fn directory(&self) -> Arc<PlayerDirectory> {
        self.directory.read().await.clone()
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("Invalid authentication credentials")]
    Unauthorized,
}

// Extractor rejections are reported as validation errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Stats(StatsError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Stats(StatsError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Stats(StatsError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Stats(StatsError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Stats(StatsError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Stats(StatsError::Upstream(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/player-suggestions", get(player_suggestions))
        .route("/api/player-stats", get(player_stats))
        .route("/api/check-line", post(check_line))
        .route("/api/seasons", get(seasons))
        .route("/api/players/refresh", post(refresh_players))
        .route_layer(middleware::from_fn(require_bearer));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerStatsQuery {
    pub player: String,
    pub season: String,
}

#[derive(Debug, Serialize)]
pub struct PlayerStatsResponse {
    pub stats: Vec<AnnotatedGame>,
    pub averages: AggregateSummary,
    pub seasons: Vec<Season>,
    pub player_id: PlayerId,
}

#[derive(Debug, Deserialize)]
pub struct LineCheckRequest {
    pub player_name: String,
    pub season: String,
    pub stat_type: String,
    pub stat_value: f64,
    pub over_under: String,
}

#[derive(Debug, Serialize)]
pub struct LineCheckResponse {
    pub message: String,
    pub success: bool,
    #[serde(flatten)]
    pub result: LineResult,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Requires `Authorization: Bearer <token>`; the token itself is passed through unverified
async fn require_bearer(request: Request, next: Next) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default();

    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

async fn health() -> &'static str {
    "ok"
}

async fn seasons() -> Json<Vec<Season>> {
    Json(generate_seasons(Local::now().date_naive()))
}

async fn player_suggestions(
    State(state): State<AppState>,
    params: Result<Query<SuggestionsQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.directory().await.suggest(&params.query)))
}

async fn player_stats(
    State(state): State<AppState>,
    params: Result<Query<PlayerStatsQuery>, QueryRejection>,
) -> Result<Json<PlayerStatsResponse>, ApiError> {
    let Query(params) = params?;
    info!("Received request for player: {}, season: {}", params.player, params.season);

    let season: Season = params.season.parse()?;
    let player_id = state.directory().await.resolve(&params.player)?;
    let games = state.fetcher.fetch(player_id, &season).await?;

    Ok(Json(PlayerStatsResponse {
        stats: annotate(&games),
        averages: aggregate(&games),
        seasons: generate_seasons(Local::now().date_naive()),
        player_id,
    }))
}

async fn check_line(
    State(state): State<AppState>,
    request: Result<Json<LineCheckRequest>, JsonRejection>,
) -> Result<Json<LineCheckResponse>, ApiError> {
    let Json(request) = request?;
    let query = LineQuery::parse(&request.stat_type, &request.over_under, request.stat_value)?;
    let season: Season = request.season.parse()?;
    let player_id = state.directory().await.resolve(&request.player_name)?;
    let games = state.fetcher.fetch(player_id, &season).await?;

    let result = evaluate(&games, &query);
    info!(
        "{} {}: {}/{} games",
        request.player_name, query.statistic, result.hits, result.total
    );

    Ok(Json(LineCheckResponse {
        message: result.message(),
        success: true,
        result,
    }))
}

async fn refresh_players(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let players = state
        .roster
        .active_players()
        .await
        .map_err(|e| StatsError::Upstream(format!("{:#}", e)))?;

    if players.is_empty() {
        warn!("Roster source returned no players, keeping the current directory");
        return Err(StatsError::Upstream("roster source returned no players".to_string()).into());
    }

    let directory = PlayerDirectory::from_entries(&players);
    let count = directory.len();
    *state.directory.write().await = Arc::new(directory);

    info!("Player directory rebuilt with {} players", count);
    Ok(Json(serde_json::json!({ "players": count })))
}
