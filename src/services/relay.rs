// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client side of the relay contract.
//!
//! The relay holds the Whoop client secret and performs every call to Whoop
//! on our behalf. The only error a relay call itself produces is
//! [`WhoopError::RelayUnreachable`]; any HTTP status, success or not, comes
//! back as a [`RelayResponse`] for the caller to interpret.

use crate::error::WhoopError;
use crate::models::{RelayRequest, RelayResponse};
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Relay: Send + Sync {
    /// `grant_type=authorization_code` exchange.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<RelayResponse, WhoopError>;

    /// `grant_type=refresh_token` exchange.
    async fn refresh(&self, refresh_token: &str) -> Result<RelayResponse, WhoopError>;

    /// Authenticated GET of `endpoint` on the Whoop developer API.
    async fn api(&self, endpoint: &str, access_token: &str) -> Result<RelayResponse, WhoopError>;
}

/// Relay reached over HTTP.
#[derive(Clone)]
pub struct HttpRelay {
    http: reqwest::Client,
    url: String,
}

impl HttpRelay {
    /// Every call is bounded by `timeout`; a hung relay surfaces as
    /// `RelayUnreachable`.
    pub fn new(url: String, timeout: Duration) -> Result<Self, WhoopError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WhoopError::RelayUnreachable(format!("HTTP client init failed: {}", e)))?;
        Ok(Self { http, url })
    }

    async fn post(&self, request: &RelayRequest) -> Result<RelayResponse, WhoopError> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| WhoopError::RelayUnreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| WhoopError::RelayUnreachable(format!("Failed to read body: {}", e)))?;

        // Bodies are JSON by contract; keep anything else as a string for diagnostics.
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        tracing::debug!(status, action = ?request.action, "Relay responded");
        Ok(RelayResponse { status, body })
    }
}

#[async_trait]
impl Relay for HttpRelay {
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<RelayResponse, WhoopError> {
        self.post(&RelayRequest::exchange(code, redirect_uri)).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RelayResponse, WhoopError> {
        self.post(&RelayRequest::refresh(refresh_token)).await
    }

    async fn api(&self, endpoint: &str, access_token: &str) -> Result<RelayResponse, WhoopError> {
        self.post(&RelayRequest::api(endpoint, access_token)).await
    }
}
