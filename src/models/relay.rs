//! Relay wire format.
//!
//! A single JSON body with an optional `action` discriminator. No action means
//! authorization-code exchange.

use serde::{Deserialize, Serialize};

/// Request body accepted by `POST /relay`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(
        default,
        rename = "accessToken",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// Validated relay operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayAction {
    Api {
        endpoint: String,
        access_token: String,
    },
    Refresh {
        refresh_token: String,
    },
    Exchange {
        code: String,
        redirect_uri: String,
    },
}

impl RelayRequest {
    pub fn api(endpoint: &str, access_token: &str) -> Self {
        Self {
            action: Some("api".to_string()),
            endpoint: Some(endpoint.to_string()),
            access_token: Some(access_token.to_string()),
            ..Default::default()
        }
    }

    pub fn refresh(refresh_token: &str) -> Self {
        Self {
            action: Some("refresh".to_string()),
            refresh_token: Some(refresh_token.to_string()),
            ..Default::default()
        }
    }

    pub fn exchange(code: &str, redirect_uri: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            redirect_uri: Some(redirect_uri.to_string()),
            ..Default::default()
        }
    }

    /// Resolve the discriminator and check required fields.
    ///
    /// Unknown actions fall through to code exchange. Empty strings count as
    /// missing.
    pub fn into_action(self) -> Result<RelayAction, &'static str> {
        fn present(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }

        match self.action.as_deref() {
            Some("api") => match (present(self.endpoint), present(self.access_token)) {
                (Some(endpoint), Some(access_token)) => Ok(RelayAction::Api {
                    endpoint,
                    access_token,
                }),
                _ => Err("Missing endpoint or accessToken"),
            },
            Some("refresh") => present(self.refresh_token)
                .map(|refresh_token| RelayAction::Refresh { refresh_token })
                .ok_or("Missing refresh_token"),
            _ => match (present(self.code), present(self.redirect_uri)) {
                (Some(code), Some(redirect_uri)) => {
                    Ok(RelayAction::Exchange { code, redirect_uri })
                }
                _ => Err("Missing code or redirect_uri"),
            },
        }
    }
}

/// Status and JSON body returned by the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl RelayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
