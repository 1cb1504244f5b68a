//! HTTP surface over the engine: the respond/analyze endpoints plus a small
//! debug/admin set. Message text is validated here, since the engine treats
//! any string as valid input.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::analyze::MessageAnalysis;
use crate::engine::ResponseEngine;
use crate::response::{CustomerContext, ResponsePayload};
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ResponseEngine>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/respond", post(respond))
        .route("/analyze", post(analyze))
        .route("/debug/session", get(debug_session))
        .route("/debug/flows", get(debug_flows))
        .route("/admin/clear-session", post(admin_clear_session))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct RespondReq {
    text: String,
    conversation_id: String,
    #[serde(default)]
    context: CustomerContext,
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
}

#[derive(serde::Serialize)]
struct ApiError {
    error: &'static str,
}

async fn respond(
    State(state): State<AppState>,
    Json(body): Json<RespondReq>,
) -> Result<Json<ResponsePayload>, (StatusCode, Json<ApiError>)> {
    if body.text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "text must not be empty",
            }),
        ));
    }
    if body.conversation_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "conversation_id must not be empty",
            }),
        ));
    }

    let payload = state
        .engine
        .respond(&body.text, &body.conversation_id, &body.context)
        .await;
    Ok(Json(payload))
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<MessageAnalysis>, (StatusCode, Json<ApiError>)> {
    if body.text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "text must not be empty",
            }),
        ));
    }
    let analysis = state
        .engine
        .analyze_message(&body.text, &CustomerContext::default());
    Ok(Json(analysis))
}

async fn debug_session(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Option<Session>> {
    let id = q.get("id").cloned().unwrap_or_default();
    Json(state.engine.sessions().snapshot(&id))
}

#[derive(serde::Serialize)]
struct FlowInfo {
    name: String,
    triggers: usize,
    actions: usize,
    escalate: bool,
}

async fn debug_flows(State(state): State<AppState>) -> Json<Vec<FlowInfo>> {
    let set = state.engine.flows_snapshot();
    let out = set
        .flows
        .iter()
        .map(|f| FlowInfo {
            name: f.name.clone(),
            triggers: f.triggers.len(),
            actions: f.actions.len(),
            escalate: f.escalate,
        })
        .collect();
    Json(out)
}

#[derive(serde::Deserialize)]
struct ClearReq {
    conversation_id: String,
}

async fn admin_clear_session(
    State(state): State<AppState>,
    Json(body): Json<ClearReq>,
) -> impl IntoResponse {
    if state.engine.clear_session(&body.conversation_id) {
        (StatusCode::OK, "cleared")
    } else {
        (StatusCode::NOT_FOUND, "no such session")
    }
}
