// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whoop OAuth connection routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/whoop", get(auth_start))
        .route("/auth/whoop/callback", get(auth_callback))
        .route("/auth/whoop/status", get(status))
        .route("/auth/whoop/disconnect", post(disconnect))
}

/// Start OAuth flow - redirect to Whoop authorization.
async fn auth_start(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let auth_url = state.oauth.initiate_auth()?;
    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, then send the browser back to
/// the integrations page with the outcome.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let integrations = format!("{}/integrations", state.config.frontend_url);

    // User denied consent
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Whoop");
        return redirect_with_error(&integrations, &format!("Authorization denied: {}", error));
    }

    let (code, oauth_state) = match (params.code, params.state) {
        (Some(code), Some(s)) if !code.is_empty() && !s.is_empty() => (code, s),
        _ => return redirect_with_error(&integrations, "Missing authorization code or state"),
    };

    let outcome = state.oauth.handle_callback(&code, &oauth_state).await;

    if outcome.success {
        Redirect::temporary(&format!("{}?whoop=connected", integrations))
    } else {
        let error = outcome
            .error
            .unwrap_or_else(|| "Unknown error occurred".to_string());
        redirect_with_error(&integrations, &error)
    }
}

fn redirect_with_error(base: &str, error: &str) -> Redirect {
    Redirect::temporary(&format!("{}?error={}", base, urlencoding::encode(error)))
}

/// Whoop connection state.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<String>,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        connected: state.token_store.is_connected(),
        access_token_expires_at: state.token_store.expires_at().map(format_utc_rfc3339),
    })
}

/// Disconnect - forget all Whoop tokens.
async fn disconnect(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.token_store.clear_token()?;
    tracing::info!("Whoop disconnected by user");
    Ok(StatusCode::NO_CONTENT)
}
