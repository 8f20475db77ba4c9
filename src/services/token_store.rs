// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whoop token state: access token, its expiry, and the refresh token.
//!
//! The three values are stored under independent keys. Expiry is the raw
//! issuer value (`now + expires_in`); the refresh margin is applied only when
//! reading.

use crate::error::WhoopError;
use crate::models::TokenResponse;
use crate::storage::{keys, KeyValueStore};
use crate::time_utils::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Margin before token expiration when we treat the token as gone (5 minutes).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Single source of truth for the current token state.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Access token, if it is valid for more than the refresh margin.
    ///
    /// A token inside the margin is reported as absent but left in storage.
    pub fn get_access_token(&self) -> Option<String> {
        let token = self.storage.get(keys::ACCESS_TOKEN)?;
        let expires_at = self.expires_at()?;

        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        if self.clock.now() < expires_at - margin {
            Some(token)
        } else {
            None
        }
    }

    /// Stored refresh token, regardless of access token state.
    pub fn refresh_token(&self) -> Option<String> {
        self.storage
            .get(keys::REFRESH_TOKEN)
            .filter(|t| !t.is_empty())
    }

    /// Raw access token expiry as stored.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.storage.get(keys::ACCESS_TOKEN_EXPIRY)?.parse().ok()?;
        DateTime::from_timestamp_millis(millis)
    }

    /// Persist a token response.
    ///
    /// A response without a refresh token keeps the previously stored one.
    pub fn save_token(&self, token: &TokenResponse) -> Result<(), WhoopError> {
        let expires_at = Duration::try_seconds(token.expires_in)
            .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                WhoopError::Storage(format!("Token lifetime out of range: {}s", token.expires_in))
            })?;

        self.storage.set(keys::ACCESS_TOKEN, &token.access_token)?;
        self.storage.set(
            keys::ACCESS_TOKEN_EXPIRY,
            &expires_at.timestamp_millis().to_string(),
        )?;

        if let Some(refresh_token) = token.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            self.storage.set(keys::REFRESH_TOKEN, refresh_token)?;
        }

        tracing::debug!(
            expires_at = %expires_at,
            rotated_refresh = token.refresh_token.is_some(),
            "Saved Whoop token"
        );
        Ok(())
    }

    /// Remove all token state.
    pub fn clear_token(&self) -> Result<(), WhoopError> {
        self.storage.remove(keys::ACCESS_TOKEN)?;
        self.storage.remove(keys::ACCESS_TOKEN_EXPIRY)?;
        self.storage.remove(keys::REFRESH_TOKEN)?;
        tracing::info!("Cleared Whoop token state");
        Ok(())
    }

    /// True if a request could be made without user interaction.
    pub fn is_connected(&self) -> bool {
        self.get_access_token().is_some() || self.refresh_token().is_some()
    }
}
