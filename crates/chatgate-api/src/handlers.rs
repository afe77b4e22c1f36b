//! Route handler functions for all API endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use chatgate_chat::RouteOutcome;
use chatgate_core::types::{ActorId, FilterStats, HistoryEntry, SweepReport, Verdict};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

/// Sender id as it arrives over the wire: chat platforms use either form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ActorParam {
    Number(i64),
    Text(String),
}

impl ActorParam {
    fn into_actor(self) -> Result<ActorId, ApiError> {
        match self {
            ActorParam::Number(n) => Ok(ActorId::from(n)),
            ActorParam::Text(s) if s.trim().is_empty() => {
                Err(ApiError::BadRequest("'actor_id' must not be empty".to_string()))
            }
            ActorParam::Text(s) => Ok(ActorId::from(s)),
        }
    }
}

/// Body for `POST /messages`.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub actor_id: ActorParam,
    /// Missing or null text is routed as an empty message.
    #[serde(default)]
    pub text: Option<String>,
    /// Group chat: only messages mentioning the bot are handled.
    #[serde(default)]
    pub group: bool,
}

/// Body for `POST /filter/check`.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub actor_id: ActorParam,
    /// Missing or null text is checked as empty.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub total_processed: u64,
    pub total_blocked: u64,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub duplicate: bool,
    pub verdict: Verdict,
}

#[derive(Debug, Serialize)]
pub struct RecentResponse {
    pub actor_id: ActorId,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let stats = state.filter.stats()?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_processed: stats.total_processed,
        total_blocked: stats.total_blocked,
    }))
}

/// POST /messages - route one inbound chat message.
pub async fn post_message(
    State(state): State<AppState>,
    Json(body): Json<MessageRequest>,
) -> Result<Json<RouteOutcome>, ApiError> {
    let actor = body.actor_id.into_actor()?;
    let text = body.text.as_deref().unwrap_or("");
    let outcome = if body.group {
        state.router.route_mention(actor, text).await?
    } else {
        state.router.route(actor, text).await?
    };
    Ok(Json(outcome))
}

/// POST /filter/check - run the duplicate check alone, without routing.
pub async fn check(
    State(state): State<AppState>,
    Json(body): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    let actor = body.actor_id.into_actor()?;
    let verdict = state.filter.check(actor, body.text.as_deref().unwrap_or(""))?;
    Ok(Json(CheckResponse {
        duplicate: verdict.is_duplicate(),
        verdict,
    }))
}

/// GET /filter/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<FilterStats>, ApiError> {
    Ok(Json(state.filter.stats()?))
}

/// GET /filter/actors/{id}/recent - the last `limit` entries, oldest first.
/// `limit` defaults to the per-actor history cap.
pub async fn recent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RecentParams>,
) -> Result<Json<RecentResponse>, ApiError> {
    let actor = ActorId::from(id);
    let limit = params
        .limit
        .unwrap_or(state.config.filter.max_history_per_actor);
    let entries = state.filter.recent(&actor, limit)?;
    Ok(Json(RecentResponse {
        actor_id: actor,
        entries,
    }))
}

/// DELETE /filter/actors/{id}
pub async fn clear_actor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClearResponse>, ApiError> {
    state.filter.clear_actor_cache(id.as_str())?;
    tracing::info!(actor = %id, "Cleared duplicate cache via API");
    Ok(Json(ClearResponse { cleared: id }))
}

/// DELETE /filter
pub async fn clear_all(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    state.filter.clear_all()?;
    tracing::info!("Cleared duplicate filter via API");
    Ok(Json(ClearResponse {
        cleared: "all".to_string(),
    }))
}

/// POST /filter/sweep - evict expired history for every actor now.
pub async fn sweep(State(state): State<AppState>) -> Result<Json<SweepReport>, ApiError> {
    Ok(Json(state.filter.sweep()?))
}
