//! Application configuration loaded from environment variables.
//!
//! The Whoop client secret only ever lives here and in the relay; the
//! connector side talks to the relay and never sees it.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_AUTH_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/auth";
const DEFAULT_TOKEN_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/token";
const DEFAULT_API_BASE: &str = "https://api.prod.whoop.com/developer/v2";
const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 30;

/// Scopes requested during authorization. `offline` is what makes Whoop
/// issue a refresh token.
pub const WHOOP_SCOPES: &[&str] = &[
    "offline",
    "read:profile",
    "read:recovery",
    "read:sleep",
    "read:workout",
    "read:cycles",
    "read:body_measurement",
];

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whoop OAuth client ID (public)
    pub whoop_client_id: String,
    /// Whoop OAuth client secret (relay only)
    pub whoop_client_secret: String,
    /// Redirect URI registered with Whoop
    pub whoop_redirect_uri: String,
    /// Whoop authorization endpoint
    pub whoop_auth_url: String,
    /// Whoop token endpoint
    pub whoop_token_url: String,
    /// Whoop developer API base URL
    pub whoop_api_base: String,
    /// Frontend URL for post-callback redirects
    pub frontend_url: String,
    /// Relay endpoint used by the connector
    pub relay_url: String,
    /// Upper bound on every relay and upstream call
    pub relay_timeout: Duration,
    /// File backing the persisted token state
    pub token_store_path: PathBuf,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            whoop_client_id: "test_client_id".to_string(),
            whoop_client_secret: "test_secret".to_string(),
            whoop_redirect_uri: "http://localhost:8080/auth/whoop/callback".to_string(),
            whoop_auth_url: DEFAULT_AUTH_URL.to_string(),
            whoop_token_url: DEFAULT_TOKEN_URL.to_string(),
            whoop_api_base: DEFAULT_API_BASE.to_string(),
            frontend_url: "http://localhost:4200".to_string(),
            relay_url: "http://127.0.0.1:8080/relay".to_string(),
            relay_timeout: Duration::from_secs(5),
            token_store_path: PathBuf::from("data/test_whoop_tokens.json"),
            port: 8080,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT", v))?,
            Err(_) => 8080,
        };

        let relay_timeout_secs: u64 = match env::var("WHOOP_RELAY_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("WHOOP_RELAY_TIMEOUT_SECS", v))?,
            Err(_) => DEFAULT_RELAY_TIMEOUT_SECS,
        };

        Ok(Self {
            whoop_client_id: env::var("WHOOP_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WHOOP_CLIENT_ID"))?,
            whoop_client_secret: env::var("WHOOP_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WHOOP_CLIENT_SECRET"))?,
            whoop_redirect_uri: env::var("WHOOP_REDIRECT_URI")
                .unwrap_or_else(|_| format!("http://localhost:{}/auth/whoop/callback", port)),
            whoop_auth_url: env::var("WHOOP_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            whoop_token_url: env::var("WHOOP_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            whoop_api_base: env::var("WHOOP_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:4200".to_string()),
            relay_url: env::var("RELAY_URL")
                .unwrap_or_else(|_| format!("http://127.0.0.1:{}/relay", port)),
            relay_timeout: Duration::from_secs(relay_timeout_secs),
            token_store_path: env::var("TOKEN_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/whoop_tokens.json")),
            port,
        })
    }

    /// Space-delimited scope list for the authorization URL.
    pub fn scope(&self) -> String {
        WHOOP_SCOPES.join(" ")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("WHOOP_CLIENT_ID", "test_id");
        env::set_var("WHOOP_CLIENT_SECRET", " test_secret\n");
        env::remove_var("PORT");
        env::remove_var("RELAY_URL");
        env::remove_var("WHOOP_RELAY_TIMEOUT_SECS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.whoop_client_id, "test_id");
        assert_eq!(config.whoop_client_secret, "test_secret");
        assert_eq!(config.port, 8080);
        assert_eq!(config.relay_url, "http://127.0.0.1:8080/relay");
        assert_eq!(config.relay_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_scope_is_space_delimited() {
        let scope = Config::test_default().scope();
        assert!(scope.starts_with("offline read:profile"));
        assert!(!scope.contains(','));
    }
}
