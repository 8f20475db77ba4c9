// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whoop API client going through the relay.
//!
//! Handles:
//! - Picking a usable access token (refreshing when the stored one is stale)
//! - One refresh-and-retry when Whoop rejects a token we believed valid
//! - Pass-through of response bodies; the Whoop schema is not interpreted here

use crate::error::WhoopError;
use crate::services::refresher::TokenRefresher;
use crate::services::relay::Relay;
use crate::services::token_store::TokenStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// First attempt plus one retry after a refresh.
const MAX_PROXY_ATTEMPTS: u32 = 2;

/// Optional `start`/`end` bounds for collection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    fn query(&self) -> String {
        format!(
            "?start={}&end={}",
            urlencoding::encode(&crate::time_utils::format_utc_rfc3339(self.start)),
            urlencoding::encode(&crate::time_utils::format_utc_rfc3339(self.end))
        )
    }
}

/// Authenticated Whoop API access.
#[derive(Clone)]
pub struct WhoopClient {
    relay: Arc<dyn Relay>,
    store: TokenStore,
    refresher: TokenRefresher,
}

impl WhoopClient {
    pub fn new(relay: Arc<dyn Relay>, store: TokenStore, refresher: TokenRefresher) -> Self {
        Self {
            relay,
            store,
            refresher,
        }
    }

    /// GET `endpoint` (path plus query, relative to the API base).
    pub async fn request(&self, endpoint: &str) -> Result<serde_json::Value, WhoopError> {
        let mut access_token = self.obtain_token().await?;

        for attempt in 1..=MAX_PROXY_ATTEMPTS {
            let response = self.relay.api(endpoint, &access_token).await?;

            if response.is_success() {
                return Ok(response.body);
            }

            if response.status != 401 {
                tracing::warn!(endpoint, status = response.status, "Whoop API request failed");
                return Err(WhoopError::ApiRequestFailed {
                    status: response.status,
                    body: response.body,
                });
            }

            if attempt == MAX_PROXY_ATTEMPTS {
                break;
            }

            tracing::info!(endpoint, "Whoop rejected access token, refreshing and retrying");
            let refresh_token = match self.store.refresh_token() {
                Some(t) => t,
                None => break,
            };
            access_token = self.refresher.refresh(&refresh_token).await?;
        }

        tracing::warn!(endpoint, "Whoop authentication expired");
        self.store.clear_token()?;
        Err(WhoopError::AuthenticationExpired)
    }

    /// Stored token if still valid, otherwise a refreshed one.
    async fn obtain_token(&self) -> Result<String, WhoopError> {
        if let Some(token) = self.store.get_access_token() {
            return Ok(token);
        }

        match self.store.refresh_token() {
            Some(refresh_token) => {
                tracing::info!("Access token expired or expiring, refreshing");
                self.refresher.refresh(&refresh_token).await
            }
            None => Err(WhoopError::NotAuthenticated),
        }
    }

    // ─── API Wrappers ────────────────────────────────────────────────────────

    pub async fn get_profile(&self) -> Result<serde_json::Value, WhoopError> {
        self.request("/user/profile/basic").await
    }

    pub async fn get_body_measurement(&self) -> Result<serde_json::Value, WhoopError> {
        self.request("/user/measurement/body").await
    }

    pub async fn get_recovery(
        &self,
        range: Option<DateRange>,
    ) -> Result<serde_json::Value, WhoopError> {
        self.request(&with_range("/recovery", range)).await
    }

    pub async fn get_sleep(&self, range: Option<DateRange>) -> Result<serde_json::Value, WhoopError> {
        self.request(&with_range("/activity/sleep", range)).await
    }

    pub async fn get_workouts(
        &self,
        range: Option<DateRange>,
    ) -> Result<serde_json::Value, WhoopError> {
        self.request(&with_range("/activity/workout", range)).await
    }

    /// Physiological cycles (daily strain).
    pub async fn get_cycles(&self, range: Option<DateRange>) -> Result<serde_json::Value, WhoopError> {
        self.request(&with_range("/cycle", range)).await
    }
}

fn with_range(path: &str, range: Option<DateRange>) -> String {
    match range {
        Some(range) => format!("{}{}", path, range.query()),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_range() {
        assert_eq!(with_range("/cycle", None), "/cycle");

        let range = DateRange {
            start: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            end: DateTime::from_timestamp(1_700_086_400, 0).unwrap(),
        };
        assert_eq!(
            with_range("/recovery", Some(range)),
            "/recovery?start=2023-11-14T22%3A13%3A20Z&end=2023-11-15T22%3A13%3A20Z"
        );
    }
}
