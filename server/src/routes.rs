//! HTTP routes.
//!
//! Successful calls answer with the JSON body of the underlying result
//! type. Failures answer with `{ "error": kind, "message": text }`, except
//! `POST /dispatch`, which always returns the full `DispatchResult` and
//! only picks the status code from its error kind.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use switchboard_agents::MemorySnapshot;

use switchboard_contracts::{
    agent::{AgentDescriptor, AgentId, Availability},
    dispatch::{DispatchFailure, DispatchLogEntry, DispatchRequest, DispatchResult, DispatcherStatus},
    error::SwitchboardError,
    optimize::{CycleSummary, MetricsSnapshot, OptimizationRecord, OptimizerStatus, Recommendation},
    provider::{ProviderDescriptor, ProviderId, ProviderStatus},
};
use switchboard_optimizer::DEFAULT_RECENT_LIMIT;

use crate::context::AppContext;

type Ctx = Arc<AppContext>;

/// Entries returned by `GET /dispatcher/logs` without `?limit`.
pub const DEFAULT_LOG_LIMIT: usize = 20;

pub fn router(ctx: Ctx) -> Router {
    Router::new()
        .merge(dispatch_routes())
        .merge(dispatcher_routes())
        .merge(optimizer_routes())
        .route("/health", get(health))
        .with_state(ctx)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal_error",
            message: message.into(),
        }
    }
}

impl From<SwitchboardError> for ApiError {
    fn from(e: SwitchboardError) -> Self {
        let (status, kind) = match &e {
            SwitchboardError::AgentNotFound { .. } => (StatusCode::NOT_FOUND, "agent_not_found"),
            SwitchboardError::ProviderNotFound { .. } => (StatusCode::NOT_FOUND, "provider_not_found"),
            SwitchboardError::NoAgentAvailable => (StatusCode::SERVICE_UNAVAILABLE, "no_agent_available"),
            SwitchboardError::HandlerFailed { .. } => (StatusCode::BAD_GATEWAY, "handler_failure"),
            SwitchboardError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            SwitchboardError::MetricsUnavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, "metrics_unavailable"),
            SwitchboardError::PersistenceFailed { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "persistence_failed"),
            SwitchboardError::ConfigError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        };
        Self { status, kind, message: e.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.kind, "message": self.message }));
        (self.status, body).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

fn dispatch_routes() -> Router<Ctx> {
    Router::new().route("/dispatch", post(dispatch))
}

/// HTTP status for a dispatch outcome.
pub fn dispatch_status(result: &DispatchResult) -> StatusCode {
    match result.error {
        None => StatusCode::OK,
        Some(DispatchFailure::NoAgentAvailable) => StatusCode::SERVICE_UNAVAILABLE,
        Some(DispatchFailure::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        Some(DispatchFailure::HandlerFailure) => StatusCode::BAD_GATEWAY,
    }
}

async fn dispatch(
    State(ctx): State<Ctx>,
    Json(req): Json<DispatchRequest>,
) -> Result<(StatusCode, Json<DispatchResult>), ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::bad_request("text must not be empty"));
    }

    let result = ctx.dispatcher.dispatch(&req.text, req.context).await;
    Ok((dispatch_status(&result), Json(result)))
}

// ── Dispatcher administration ─────────────────────────────────────────────────

fn dispatcher_routes() -> Router<Ctx> {
    Router::new()
        .route("/dispatcher/status", get(dispatcher_status))
        .route("/dispatcher/logs", get(dispatcher_logs))
        .route("/dispatcher/agents", get(list_agents))
        .route("/dispatcher/providers", get(list_providers))
        .route("/dispatcher/agents/:id/availability", put(set_agent_availability))
        .route("/dispatcher/agents/:id/memory", get(agent_memory))
        .route("/dispatcher/providers/:id/status", put(set_provider_status))
}

async fn dispatcher_status(State(ctx): State<Ctx>) -> Json<DispatcherStatus> {
    Json(ctx.dispatcher.status())
}

async fn dispatcher_logs(
    State(ctx): State<Ctx>,
    Query(q): Query<LimitQuery>,
) -> Json<Vec<DispatchLogEntry>> {
    Json(ctx.dispatcher.recent_log(q.limit.unwrap_or(DEFAULT_LOG_LIMIT)))
}

async fn list_agents(State(ctx): State<Ctx>) -> Json<Vec<AgentDescriptor>> {
    Json(ctx.dispatcher.agents().list())
}

async fn list_providers(State(ctx): State<Ctx>) -> Json<Vec<ProviderDescriptor>> {
    Json(ctx.dispatcher.providers().list())
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityUpdate {
    pub availability: Availability,
}

async fn set_agent_availability(
    State(ctx): State<Ctx>,
    Path(id): Path<String>,
    Json(update): Json<AvailabilityUpdate>,
) -> Result<Json<AgentDescriptor>, ApiError> {
    let id = AgentId::new(id);
    let agents = ctx.dispatcher.agents();
    agents.set_availability(&id, update.availability)?;
    info!(agent_id = %id, availability = ?update.availability, "agent availability changed");
    Ok(Json(agents.get(&id)?))
}

/// Only personal agents keep memory; any other id is `agent_not_found`.
async fn agent_memory(
    State(ctx): State<Ctx>,
    Path(id): Path<String>,
) -> Result<Json<MemorySnapshot>, ApiError> {
    let agent = ctx.personal_agent(&AgentId::new(id))?;
    Ok(Json(agent.snapshot()?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ProviderStatus,
}

async fn set_provider_status(
    State(ctx): State<Ctx>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<ProviderDescriptor>, ApiError> {
    let id = ProviderId::new(id);
    let providers = ctx.dispatcher.providers();
    providers.set_status(&id, update.status)?;
    info!(provider_id = %id, status = ?update.status, "provider status changed");
    Ok(Json(providers.get(&id)?))
}

// ── Optimizer ─────────────────────────────────────────────────────────────────

fn optimizer_routes() -> Router<Ctx> {
    Router::new()
        .route("/optimizer/run-cycle", post(run_cycle))
        .route("/optimizer/status", get(optimizer_status))
        .route("/optimizer/metrics", get(recent_metrics))
        .route("/optimizer/recommendations", get(recent_recommendations))
        .route("/optimizer/optimizations", get(recent_optimizations))
}

async fn run_cycle(State(ctx): State<Ctx>) -> Result<Json<CycleSummary>, ApiError> {
    let summary = tokio::task::spawn_blocking(move || ctx.optimizer.run_cycle())
        .await
        .map_err(|e| {
            error!(error = %e, "optimizer cycle task failed");
            ApiError::internal(format!("optimizer cycle failed: {}", e))
        })?;
    Ok(Json(summary))
}

async fn optimizer_status(State(ctx): State<Ctx>) -> Json<OptimizerStatus> {
    Json(ctx.optimizer.status())
}

async fn recent_metrics(
    State(ctx): State<Ctx>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<MetricsSnapshot>>, ApiError> {
    let limit = q.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(ctx.optimizer.recent_metrics(limit)?))
}

async fn recent_recommendations(
    State(ctx): State<Ctx>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let limit = q.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(ctx.optimizer.recent_recommendations(limit)?))
}

async fn recent_optimizations(
    State(ctx): State<Ctx>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<OptimizationRecord>>, ApiError> {
    let limit = q.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(ctx.optimizer.recent_optimizations(limit)?))
}

// ── Health ────────────────────────────────────────────────────────────────────

async fn health(State(ctx): State<Ctx>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "switchboard",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": ctx.started.elapsed().as_secs(),
        "timestamp": Utc::now(),
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
