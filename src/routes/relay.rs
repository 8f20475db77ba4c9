// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Relay route: token exchange, token refresh and API proxying on behalf of
//! the connector, with the client secret attached server-side.

use crate::models::{RelayAction, RelayRequest};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Relay routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/relay", post(relay))
}

/// Dispatch on `action`, returning the upstream status and body.
async fn relay(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Malformed relay request");
            return error_response(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };

    let action = match request.into_action() {
        Ok(a) => a,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, msg),
    };

    let result = match action {
        RelayAction::Api {
            endpoint,
            access_token,
        } => state.upstream.api(&endpoint, &access_token).await,
        RelayAction::Refresh { refresh_token } => state.upstream.refresh(&refresh_token).await,
        RelayAction::Exchange { code, redirect_uri } => {
            state.upstream.exchange_code(&code, &redirect_uri).await
        }
    };

    match result {
        Ok(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(reply.body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Relay could not reach Whoop");
            error_response(StatusCode::BAD_GATEWAY, &format!("{:#}", e))
        }
    }
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (status, Json(serde_json::json!({ "error": error }))).into_response()
}
