// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Relay side of the Whoop integration: the only code holding the client
//! secret and talking to Whoop directly.
//!
//! Every method returns the status and JSON body to hand back to the relay
//! caller. `Err` is reserved for failures reaching Whoop at all.

use crate::config::Config;
use crate::models::RelayResponse;
use anyhow::Context;
use serde_json::{json, Value};

/// Whoop token endpoint and developer API client.
#[derive(Clone)]
pub struct WhoopUpstream {
    http: reqwest::Client,
    token_url: String,
    api_base: String,
    client_id: String,
    client_secret: String,
}

impl WhoopUpstream {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.relay_timeout)
            .build()
            .context("Failed to build Whoop HTTP client")?;

        Ok(Self {
            http,
            token_url: config.whoop_token_url.clone(),
            api_base: config.whoop_api_base.trim_end_matches('/').to_string(),
            client_id: config.whoop_client_id.clone(),
            client_secret: config.whoop_client_secret.clone(),
        })
    }

    /// Proxy a GET to the developer API, returning status and body verbatim.
    pub async fn api(&self, endpoint: &str, access_token: &str) -> anyhow::Result<RelayResponse> {
        let url = format!("{}{}", self.api_base, endpoint);
        tracing::info!(url = %url, "Calling Whoop API");

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .with_context(|| format!("Whoop API request failed: {}", url))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read Whoop API response: {}", url))?;
        tracing::info!(status, "Whoop API responded");

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            Err(_) => json!({
                "error": "Whoop API error",
                "status": status,
                "response": text,
                "url": url,
            }),
        };

        Ok(RelayResponse { status, body })
    }

    /// `grant_type=refresh_token` exchange.
    pub async fn refresh(&self, refresh_token: &str) -> anyhow::Result<RelayResponse> {
        self.token_request(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ],
            "Token refresh failed",
        )
        .await
    }

    /// `grant_type=authorization_code` exchange.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> anyhow::Result<RelayResponse> {
        self.token_request(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ],
            "Token exchange failed",
        )
        .await
    }

    async fn token_request(
        &self,
        form: &[(&str, &str)],
        failure: &str,
    ) -> anyhow::Result<RelayResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .context("Whoop token request failed")?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .context("Failed to read Whoop token response")?;
        let data = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        if !(200..300).contains(&status) {
            tracing::error!(status, error = failure, "Whoop token endpoint rejected request");
            return Ok(RelayResponse {
                status,
                body: json!({ "error": failure, "details": data }),
            });
        }

        Ok(RelayResponse {
            status: 200,
            body: data,
        })
    }
}
