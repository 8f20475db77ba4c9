//! Key-value storage backing the token state.
//!
//! Two scopes exist: a persistent store that survives restarts (tokens) and a
//! session store that lives only as long as the process (OAuth state nonce).

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::WhoopError;

/// Key names as constants.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "whoop_token";
    /// Access token expiry, epoch milliseconds as a decimal string
    pub const ACCESS_TOKEN_EXPIRY: &str = "whoop_token_expiry";
    pub const REFRESH_TOKEN: &str = "whoop_refresh_token";
    /// Session-scoped CSRF nonce
    pub const OAUTH_STATE: &str = "whoop_oauth_state";
}

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), WhoopError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), WhoopError>;

    /// Remove `key` and return its value in one step. Of any number of
    /// concurrent callers, at most one sees `Some`.
    fn take(&self, key: &str) -> Result<Option<String>, WhoopError>;
}
