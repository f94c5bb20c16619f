// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ENDPOINT HANDLERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::types::HealthResponse;
use super::AppState;
use crate::handler::LambdaResponse;

// ── GET /health ─────────────────────────────────

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

// ── POST /invoke ────────────────────────────────

/// Recebe o evento serverless completo e devolve a resposta do handler
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Json(event): Json<Value>,
) -> Json<LambdaResponse> {
    log::info!("[invoke] Novo evento");
    Json(state.handler.handle(event).await)
}

// ── POST /itinerary ─────────────────────────────

/// Corpo cru vira o `body` do evento; o status HTTP é o do handler
pub async fn itinerary(State(state): State<Arc<AppState>>, body: String) -> Response {
    let event = if body.trim().is_empty() {
        json!({})
    } else {
        json!({ "body": body })
    };

    let response = state.handler.handle(event).await;
    log::info!("[itinerary] {}", response.status_code);
    into_http(response)
}

// ── Helpers ─────────────────────────────────────

fn into_http(response: LambdaResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::BAD_REQUEST);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_http_keeps_status() {
        let response = into_http(LambdaResponse::failure("composition failed: vazio"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let response = into_http(LambdaResponse::success("roteiro"));
        assert_eq!(response.status(), StatusCode::OK);
    }
}
