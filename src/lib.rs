// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Jarvis: Whoop connector for the personal health dashboard
//!
//! This crate provides the Whoop OAuth token lifecycle, the relay that keeps
//! the client secret server-side, and the authenticated API proxy the
//! dashboard reads biometrics through.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use services::{OAuthFlow, Relay, TokenRefresher, TokenStore, WhoopClient, WhoopUpstream};
use std::sync::Arc;
use storage::KeyValueStore;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub token_store: TokenStore,
    pub oauth: OAuthFlow,
    pub whoop: WhoopClient,
    pub upstream: WhoopUpstream,
}

impl AppState {
    /// Wire the connector components around the given relay and stores.
    ///
    /// `storage` holds the persisted token state, `session` the OAuth nonce.
    pub fn new(
        config: Config,
        relay: Arc<dyn Relay>,
        storage: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let token_store = TokenStore::new(storage, clock);
        let refresher = TokenRefresher::new(relay.clone(), token_store.clone());
        let oauth = OAuthFlow::new(&config, relay.clone(), token_store.clone(), session);
        let whoop = WhoopClient::new(relay, token_store.clone(), refresher);
        let upstream = WhoopUpstream::new(&config)?;

        Ok(Self {
            config,
            token_store,
            oauth,
            whoop,
            upstream,
        })
    }
}
