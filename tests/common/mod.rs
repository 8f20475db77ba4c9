// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::DateTime;
use jarvis::config::Config;
use jarvis::error::WhoopError;
use jarvis::models::RelayResponse;
use jarvis::routes::create_router;
use jarvis::services::{OAuthFlow, Relay, TokenRefresher, TokenStore, WhoopClient};
use jarvis::storage::MemoryStore;
use jarvis::time_utils::ManualClock;
use jarvis::AppState;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Reply = Result<RelayResponse, WhoopError>;

/// Build a relay reply.
#[allow(dead_code)]
pub fn reply(status: u16, body: Value) -> Reply {
    Ok(RelayResponse { status, body })
}

/// Token endpoint body as Whoop returns it.
#[allow(dead_code)]
pub fn token_body(access: &str, refresh: Option<&str>, expires_in: i64) -> Value {
    let mut body = json!({
        "access_token": access,
        "expires_in": expires_in,
        "scope": "offline read:recovery",
        "token_type": "bearer",
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    body
}

/// Scripted relay that counts calls per action.
///
/// Queued replies are consumed in order; once a queue is empty the default
/// success reply for that action is returned.
#[derive(Default)]
pub struct FakeRelay {
    pub exchange_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub api_calls: AtomicUsize,
    /// Access tokens seen by `api`, in call order.
    pub api_tokens: Mutex<Vec<String>>,
    /// Refresh tokens seen by `refresh`, in call order.
    pub refresh_tokens: Mutex<Vec<String>>,
    exchange_replies: Mutex<VecDeque<Reply>>,
    refresh_replies: Mutex<VecDeque<Reply>>,
    api_replies: Mutex<VecDeque<Reply>>,
    refresh_delay: Option<Duration>,
    panic_next_refresh: AtomicBool,
}

#[allow(dead_code)]
impl FakeRelay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Refresh calls take `delay` to complete, so concurrent callers overlap.
    pub fn with_refresh_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            refresh_delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn push_exchange(&self, reply: Reply) {
        self.exchange_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_refresh(&self, reply: Reply) {
        self.refresh_replies.lock().unwrap().push_back(reply);
    }

    /// The next refresh call panics instead of replying.
    pub fn panic_on_next_refresh(&self) {
        self.panic_next_refresh.store(true, Ordering::SeqCst);
    }

    pub fn push_api(&self, reply: Reply) {
        self.api_replies.lock().unwrap().push_back(reply);
    }

    pub fn exchange_count(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn api_count(&self) -> usize {
        self.api_calls.load(Ordering::SeqCst)
    }

    pub fn api_tokens(&self) -> Vec<String> {
        self.api_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl Relay for FakeRelay {
    async fn exchange_code(&self, _code: &str, _redirect_uri: &str) -> Reply {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.exchange_replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            reply(
                200,
                token_body("exchanged_access", Some("exchanged_refresh"), 3600),
            )
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Reply {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_tokens
            .lock()
            .unwrap()
            .push(refresh_token.to_string());
        if let Some(delay) = self.refresh_delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic_next_refresh.swap(false, Ordering::SeqCst) {
            panic!("relay refresh blew up");
        }
        let next = self.refresh_replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            reply(
                200,
                token_body("refreshed_access", Some("refreshed_refresh"), 3600),
            )
        })
    }

    async fn api(&self, _endpoint: &str, access_token: &str) -> Reply {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        self.api_tokens
            .lock()
            .unwrap()
            .push(access_token.to_string());
        let next = self.api_replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| reply(200, json!({ "records": [] })))
    }
}

/// Connector components wired around a fake relay, in-memory storage and a
/// manual clock.
#[allow(dead_code)]
pub struct Harness {
    pub relay: Arc<FakeRelay>,
    pub storage: Arc<MemoryStore>,
    pub session: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub store: TokenStore,
    pub refresher: TokenRefresher,
    pub oauth: OAuthFlow,
    pub client: WhoopClient,
}

#[allow(dead_code)]
pub fn harness(relay: Arc<FakeRelay>) -> Harness {
    let config = Config::test_default();
    let storage = Arc::new(MemoryStore::new());
    let session = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
    ));

    let store = TokenStore::new(storage.clone(), clock.clone());
    let refresher = TokenRefresher::new(relay.clone(), store.clone());
    let oauth = OAuthFlow::new(&config, relay.clone(), store.clone(), session.clone());
    let client = WhoopClient::new(relay.clone(), store.clone(), refresher.clone());

    Harness {
        relay,
        storage,
        session,
        clock,
        store,
        refresher,
        oauth,
        client,
    }
}

/// Create a test app around a fake relay and in-memory stores.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(relay: Arc<FakeRelay>) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(relay, Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    relay: Arc<FakeRelay>,
    config: Config,
) -> (axum::Router, Arc<AppState>) {
    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
    ));
    let state = Arc::new(
        AppState::new(
            config,
            relay,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            clock,
        )
        .expect("Failed to build app state"),
    );

    (create_router(state.clone()), state)
}
