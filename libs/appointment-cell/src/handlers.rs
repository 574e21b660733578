// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::error;

use doctor_cell::services::directory::DoctorDirectoryService;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::voice::VoiceToolRequest;
use shared_utils::cors::{cors_headers, request_origin};

use crate::services::availability::AvailabilityService;
use crate::services::booking::BookingService;
use crate::services::listing::UserAppointmentsService;

// ==============================================================================
// BOOKING WEBHOOK
// ==============================================================================

/// `POST /book` - batched tool calls or a direct booking record.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let cors = cors_headers(&state.allowed_origins, request_origin(&headers));

    match handle_book(&state, &headers, &body).await {
        Ok(value) => (cors, Json(value)).into_response(),
        Err(err) => {
            error!("Error in voice book appointment: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                cors,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// `OPTIONS /book` - CORS preflight.
#[axum::debug_handler]
pub async fn book_preflight(State(state): State<Arc<AppConfig>>, headers: HeaderMap) -> Response {
    let cors = cors_headers(&state.allowed_origins, request_origin(&headers));
    (cors, Json(json!({}))).into_response()
}

async fn handle_book(state: &AppConfig, headers: &HeaderMap, body: &[u8]) -> Result<Value> {
    let payload: VoiceToolRequest =
        serde_json::from_slice(body).context("invalid request body")?;

    if let Some(calls) = payload.tool_calls() {
        let mut results = Vec::new();

        for call in calls {
            match call.intent() {
                Some("book_appointment") => {
                    let mut args = call.booking_args();
                    args.clerk_id = payload.resolve_clerk_id(args.clerk_id.take(), headers);

                    let result = BookingService::new(state).book(&args).await;
                    results.push(json!({ "toolCallId": call.id, "result": result }));
                }
                Some("get_available_doctors") => {
                    let result = DoctorDirectoryService::new(state).spoken_listing().await;
                    results.push(json!({ "toolCallId": call.id, "result": result }));
                }
                // Unrecognized tool names produce no result entry.
                _ => {}
            }
        }

        return Ok(json!({ "results": results }));
    }

    // Direct call: same fields at the top level, same handler, same
    // identity-token precedence.
    let mut args = payload.direct.clone();
    args.clerk_id = payload.resolve_clerk_id(args.clerk_id.take(), headers);

    let result = BookingService::new(state).book(&args).await;
    Ok(json!({ "message": result }))
}

// ==============================================================================
// READ-ONLY QUERY WEBHOOKS (envelope-only)
// ==============================================================================

/// `POST /available-times` - batched tool calls only.
#[axum::debug_handler]
pub async fn get_available_times(
    State(state): State<Arc<AppConfig>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let payload: VoiceToolRequest =
        serde_json::from_slice(&body).map_err(|err| AppError::Internal(err.to_string()))?;
    let Some(calls) = payload.tool_calls() else {
        return Err(AppError::BadRequest("Invalid request format".to_string()));
    };

    let service = AvailabilityService::new(&state);
    let mut results = Vec::new();

    for call in calls {
        if call.intent() == Some("get_available_times") {
            let args = call.booking_args();
            let result = service.available_times(&args).await;
            results.push(json!({ "toolCallId": call.id, "result": result }));
        }
    }

    Ok(Json(json!({ "results": results })))
}

/// `POST /user` - batched tool calls only; identity token resolved through
/// the args/call/assistant/header chain.
#[axum::debug_handler]
pub async fn get_user_appointments(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let payload: VoiceToolRequest =
        serde_json::from_slice(&body).map_err(|err| AppError::Internal(err.to_string()))?;
    let Some(calls) = payload.tool_calls() else {
        return Err(AppError::BadRequest("Invalid request format".to_string()));
    };

    let service = UserAppointmentsService::new(&state);
    let mut results = Vec::new();

    for call in calls {
        if call.intent() == Some("get_user_appointments") {
            let mut args = call.booking_args();
            let clerk_id = payload.resolve_clerk_id(args.clerk_id.take(), &headers);

            let result = service.summarize(clerk_id.as_deref()).await;
            results.push(json!({ "toolCallId": call.id, "result": result }));
        }
    }

    Ok(Json(json!({ "results": results })))
}
