// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whoop authorization-code flow.
//!
//! Handles:
//! - Building the authorization URL with a single-use CSRF nonce
//! - Validating the nonce on callback
//! - Exchanging the code for tokens through the relay

use crate::config::Config;
use crate::error::WhoopError;
use crate::models::{CallbackOutcome, TokenResponse};
use crate::services::relay::Relay;
use crate::services::token_store::TokenStore;
use crate::storage::{keys, KeyValueStore};
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

/// Length of the OAuth state nonce.
const STATE_NONCE_LEN: usize = 32;

/// Starts and completes the Whoop OAuth flow.
#[derive(Clone)]
pub struct OAuthFlow {
    relay: Arc<dyn Relay>,
    store: TokenStore,
    /// Session-scoped storage holding the state nonce.
    session: Arc<dyn KeyValueStore>,
    client_id: String,
    redirect_uri: String,
    auth_url: String,
    scope: String,
}

impl OAuthFlow {
    pub fn new(
        config: &Config,
        relay: Arc<dyn Relay>,
        store: TokenStore,
        session: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            relay,
            store,
            session,
            client_id: config.whoop_client_id.clone(),
            redirect_uri: config.whoop_redirect_uri.clone(),
            auth_url: config.whoop_auth_url.clone(),
            scope: config.scope(),
        }
    }

    /// Generate and store a fresh nonce, then return the URL to send the
    /// browser to. Any previous nonce is replaced.
    pub fn initiate_auth(&self) -> Result<String, WhoopError> {
        let state = generate_state();
        self.session.set(keys::OAUTH_STATE, &state)?;

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope),
            state
        );

        tracing::info!(client_id = %self.client_id, "Starting Whoop OAuth flow");
        Ok(url)
    }

    /// Complete the flow. Never fails; problems are reported in the outcome.
    pub async fn handle_callback(&self, code: &str, state: &str) -> CallbackOutcome {
        // Consumed whatever the outcome, so a nonce can pass at most one check.
        let saved_state = match self.session.take(keys::OAUTH_STATE) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!(error = %e, "Failed to consume OAuth state nonce");
                return CallbackOutcome::failed(e.to_string());
            }
        };

        if saved_state.as_deref() != Some(state) {
            tracing::error!(
                had_saved_state = saved_state.is_some(),
                "OAuth state mismatch! Potential forged callback."
            );
            return CallbackOutcome::failed(WhoopError::StateMismatch.to_string());
        }

        tracing::info!("Exchanging Whoop authorization code for tokens");

        let response = match self.relay.exchange_code(code, &self.redirect_uri).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Token exchange failed");
                return CallbackOutcome::failed(e.to_string());
            }
        };

        if !response.is_success() {
            tracing::error!(status = response.status, "Whoop token exchange rejected");
            return CallbackOutcome::failed(format!(
                "Token exchange failed: {} - {}",
                response.status, response.body
            ));
        }

        let token = match TokenResponse::from_body(&response.body) {
            Ok(t) => t,
            Err(msg) => return CallbackOutcome::failed(msg),
        };

        if let Err(e) = self.store.save_token(&token) {
            return CallbackOutcome::failed(e.to_string());
        }

        tracing::info!(
            expires_in = token.expires_in,
            has_refresh_token = token.refresh_token.is_some(),
            "Whoop connected"
        );

        CallbackOutcome::ok(serde_json::json!({
            "expires_in": token.expires_in,
            "scope": token.scope,
        }))
    }
}

fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_NONCE_LEN)
        .map(char::from)
        .collect()
}
