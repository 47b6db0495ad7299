#![allow(dead_code)]
use axum::body::Body;
use axum::http::Request;
use crest_identity::{IdentityIssuer, IdentityProvider, JwtIdentityProvider};
use crest_notify::{InProcessHub, Notifier, PushTransport};
use crest_registry::ConnectionRegistry;
use crest_registry::memory::MemoryConnectionRegistry;
use crest_store::ScoreStore;
use crest_store::memory::MemoryScoreStore;
use leaderboard::app::AppState;
use leaderboard::config::LeaderboardConfig;
use leaderboard::submission::ScoreSubmission;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_SECRET: &[u8] = b"integration-secret";
pub const TEST_ISSUER: &str = "crest-auth";
pub const TEST_AUDIENCE: &str = "crest-leaderboard";

pub struct TestHarness {
    pub state: AppState,
    pub hub: Arc<InProcessHub>,
    pub issuer: IdentityIssuer,
}

pub fn harness() -> TestHarness {
    let config = Arc::new(LeaderboardConfig {
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        metrics_bind: "127.0.0.1:0".parse().expect("addr"),
        token_secret: String::from_utf8(TEST_SECRET.to_vec()).expect("secret"),
        token_issuer: TEST_ISSUER.to_string(),
        token_audience: TEST_AUDIENCE.to_string(),
        identity_timeout_ms: 500,
        store_timeout_ms: 500,
        push_timeout_ms: 200,
    });
    let identity: Arc<dyn IdentityProvider> = Arc::new(JwtIdentityProvider::new(
        TEST_SECRET,
        TEST_ISSUER,
        TEST_AUDIENCE,
    ));
    let scores: Arc<dyn ScoreStore> = Arc::new(MemoryScoreStore::new());
    let registry: Arc<dyn ConnectionRegistry> = Arc::new(MemoryConnectionRegistry::new());
    let hub = Arc::new(InProcessHub::new());
    let transport: Arc<dyn PushTransport> = hub.clone();
    let notifier = Notifier::new(
        Arc::clone(&registry),
        transport,
        Duration::from_millis(config.push_timeout_ms),
    );
    let submission = Arc::new(ScoreSubmission::new(
        Arc::clone(&identity),
        Arc::clone(&scores),
        notifier,
        &config,
    ));
    let issuer = IdentityIssuer::new(
        TEST_SECRET,
        TEST_ISSUER,
        TEST_AUDIENCE,
        Duration::from_secs(900),
    );
    TestHarness {
        state: AppState {
            config,
            identity,
            scores,
            registry,
            submission,
        },
        hub,
        issuer,
    }
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
