// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token refresh with single-flight deduplication.
//!
//! Whoop invalidates a refresh token once it has been used, so two
//! unsynchronized refreshes would leave one caller holding a dead token. At
//! most one refresh call to the relay is outstanding at any time; callers that
//! arrive while it runs await the same shared future and get the same result.

use crate::error::WhoopError;
use crate::models::TokenResponse;
use crate::services::relay::Relay;
use crate::services::token_store::TokenStore;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard};

type RefreshFuture = Shared<BoxFuture<'static, Result<String, WhoopError>>>;

/// Refreshes the Whoop access token through the relay.
#[derive(Clone)]
pub struct TokenRefresher {
    relay: Arc<dyn Relay>,
    store: TokenStore,
    /// `Some` while a refresh is running.
    in_flight: Arc<Mutex<Option<RefreshFuture>>>,
}

impl TokenRefresher {
    pub fn new(relay: Arc<dyn Relay>, store: TokenStore) -> Self {
        Self {
            relay,
            store,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// True while a refresh call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        lock(&self.in_flight).is_some()
    }

    /// Exchange the refresh token for a new access token and persist it.
    ///
    /// Joins the running refresh if there is one. Otherwise a new refresh is
    /// started with the refresh token currently in the store, falling back to
    /// `refresh_token` only when the store holds none. A caller holding a
    /// token rotated out by an earlier refresh therefore never replays it.
    ///
    /// - Issuer rejection (status 400/401): all token state is cleared and
    ///   `AuthenticationExpired` is returned.
    /// - Anything else that fails leaves the stored state untouched.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, WhoopError> {
        let pending = {
            let mut slot = lock(&self.in_flight);
            if let Some(pending) = slot.clone() {
                tracing::debug!("Joining in-flight Whoop token refresh");
                pending
            } else {
                let refresh_token = self
                    .store
                    .refresh_token()
                    .unwrap_or_else(|| refresh_token.to_string());
                let pending = run_refresh(
                    self.relay.clone(),
                    self.store.clone(),
                    self.in_flight.clone(),
                    refresh_token,
                )
                .boxed()
                .shared();
                *slot = Some(pending.clone());
                pending
            }
        };

        pending.await
    }
}

fn lock(slot: &Mutex<Option<RefreshFuture>>) -> MutexGuard<'_, Option<RefreshFuture>> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

/// Empties the in-flight slot when dropped, including during a panic unwind.
struct ClearInFlight(Arc<Mutex<Option<RefreshFuture>>>);

impl Drop for ClearInFlight {
    fn drop(&mut self) {
        lock(&self.0).take();
    }
}

async fn run_refresh(
    relay: Arc<dyn Relay>,
    store: TokenStore,
    in_flight: Arc<Mutex<Option<RefreshFuture>>>,
    refresh_token: String,
) -> Result<String, WhoopError> {
    // Dropped before the shared result is published, on every path.
    let _clear = ClearInFlight(in_flight);

    refresh_once(relay.as_ref(), &store, &refresh_token).await
}

async fn refresh_once(
    relay: &dyn Relay,
    store: &TokenStore,
    refresh_token: &str,
) -> Result<String, WhoopError> {
    tracing::info!("Refreshing Whoop access token");

    let response = match relay.refresh(refresh_token).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "Token refresh did not reach the relay, keeping stored tokens");
            return Err(e);
        }
    };

    if response.is_success() {
        let token = TokenResponse::from_body(&response.body).map_err(|msg| {
            tracing::warn!(error = %msg, "Token refresh returned an unusable body");
            WhoopError::ApiRequestFailed {
                status: response.status,
                body: response.body.clone(),
            }
        })?;

        store.save_token(&token)?;
        tracing::info!(
            expires_in = token.expires_in,
            rotated = token.refresh_token.is_some(),
            "Whoop access token refreshed"
        );
        return Ok(token.access_token);
    }

    if matches!(response.status, 400 | 401) {
        tracing::warn!(
            status = response.status,
            "Refresh token rejected by Whoop, clearing stored tokens"
        );
        store.clear_token()?;
        return Err(WhoopError::AuthenticationExpired);
    }

    tracing::warn!(
        status = response.status,
        "Token refresh failed, keeping stored tokens"
    );
    Err(WhoopError::ApiRequestFailed {
        status: response.status,
        body: response.body,
    })
}
