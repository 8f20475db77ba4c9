// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod relay;
pub mod token;

pub use relay::{RelayAction, RelayRequest, RelayResponse};
pub use token::{CallbackOutcome, TokenResponse};
