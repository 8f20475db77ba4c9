// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod oauth;
pub mod refresher;
pub mod relay;
pub mod token_store;
pub mod upstream;
pub mod whoop;

pub use oauth::OAuthFlow;
pub use refresher::TokenRefresher;
pub use relay::{HttpRelay, Relay};
pub use token_store::TokenStore;
pub use upstream::WhoopUpstream;
pub use whoop::{DateRange, WhoopClient};
