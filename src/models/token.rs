//! OAuth token payloads.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest access token lifetime accepted from the issuer (one year).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// Token response from the Whoop token endpoint (code exchange or refresh).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
    /// May be omitted on refresh; the stored one then stays in place
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Parse a relay body, distinguishing "no token in it" from other shapes.
    ///
    /// `expires_in` must lie in `0..=MAX_TOKEN_LIFETIME_SECS`.
    pub fn from_body(body: &serde_json::Value) -> Result<Self, String> {
        let token: Self = match body.get("access_token") {
            None | Some(serde_json::Value::Null) => {
                return Err("No access token received".to_string())
            }
            Some(_) => serde_json::from_value(body.clone())
                .map_err(|e| format!("Failed to parse token response: {}", e))?,
        };

        if !(0..=MAX_TOKEN_LIFETIME_SECS).contains(&token.expires_in) {
            return Err(format!("Invalid token lifetime: {}s", token.expires_in));
        }

        Ok(token)
    }
}

/// Result of completing the authorization callback.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CallbackOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallbackOutcome {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
