use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::error;

use shared_config::AppConfig;
use shared_models::voice::VoiceToolRequest;
use shared_utils::cors::{cors_headers, request_origin};

use crate::services::directory::DoctorDirectoryService;

/// `GET /doctors` - direct directory listing for web clients.
#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppConfig>>, headers: HeaderMap) -> Response {
    let cors = cors_headers(&state.allowed_origins, request_origin(&headers));

    match directory_listing(&state).await {
        Ok(value) => (cors, Json(value)).into_response(),
        Err(err) => {
            error!("Error fetching doctors for voice webhook: {err:#}");
            error_response(cors, &err)
        }
    }
}

/// `POST /doctors` - batched tool calls from the voice platform, or the same
/// direct listing when the payload is not an envelope.
#[axum::debug_handler]
pub async fn doctors_webhook(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let cors = cors_headers(&state.allowed_origins, request_origin(&headers));

    match handle_doctors(&state, &body).await {
        Ok(value) => (cors, Json(value)).into_response(),
        Err(err) => {
            error!("Error fetching doctors for voice webhook: {err:#}");
            error_response(cors, &err)
        }
    }
}

/// `OPTIONS /doctors` - CORS preflight.
#[axum::debug_handler]
pub async fn doctors_preflight(State(state): State<Arc<AppConfig>>, headers: HeaderMap) -> Response {
    let cors = cors_headers(&state.allowed_origins, request_origin(&headers));
    (cors, Json(json!({}))).into_response()
}

async fn handle_doctors(state: &AppConfig, body: &[u8]) -> Result<Value> {
    let payload: VoiceToolRequest =
        serde_json::from_slice(body).context("invalid request body")?;

    if let Some(calls) = payload.tool_calls() {
        let directory = DoctorDirectoryService::new(state);
        let mut results = Vec::new();

        for call in calls {
            if call.intent() == Some("get_available_doctors") {
                results.push(json!({
                    "toolCallId": call.id,
                    "result": directory.spoken_listing().await,
                }));
            }
            // Unrecognized tool names produce no result entry.
        }

        return Ok(json!({ "results": results }));
    }

    directory_listing(state).await
}

async fn directory_listing(state: &AppConfig) -> Result<Value> {
    let directory = DoctorDirectoryService::new(state);
    let doctors = directory.list_doctors().await?;

    Ok(json!({
        "success": true,
        "doctors": doctors,
    }))
}

fn error_response(cors: HeaderMap, err: &anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        cors,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}
