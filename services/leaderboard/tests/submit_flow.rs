mod common;

use common::{authed_json_request, harness, read_json, request};
use axum::http::StatusCode;
use crest_common::ChannelAddress;
use leaderboard::app::build_router;
use tokio::sync::mpsc::error::TryRecvError;
use tower::ServiceExt;

// End-to-end: submit 1500 for alice with one live channel. The record ranks,
// the leader reflects it, and the channel receives exactly one push.
#[tokio::test]
async fn high_score_submission_pushes_to_the_live_channel() {
    let harness = harness();
    let app = build_router(harness.state);
    let token = harness.issuer.mint("u1", "alice").expect("mint");

    let mut rx = harness.hub.open(ChannelAddress::new("c1"));
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/connections",
            &token,
            serde_json::json!({ "channel_address": "c1" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/scores",
            &token,
            serde_json::json!({ "score": 1500 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request("GET", "/v1/leaderboard/leader"))
        .await
        .expect("response");
    let body = read_json(response).await;
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["display_name"], "alice");
    assert_eq!(body["score"], 1_500);

    // Fan-out finished before the submission response, so the payload is
    // already queued.
    let payload = rx.try_recv().expect("one push");
    let event: serde_json::Value = serde_json::from_slice(&payload).expect("json");
    assert_eq!(event["message"], "realtime-update");
    assert_eq!(event["data"]["user_name"], "alice");
    assert_eq!(event["data"]["score"], 1_500);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

// End-to-end: a sub-threshold score persists without ranking and pushes
// nothing, live channels or not.
#[tokio::test]
async fn below_threshold_submission_skips_the_push() {
    let harness = harness();
    let app = build_router(harness.state);
    let token = harness.issuer.mint("u2", "bob").expect("mint");

    let mut rx = harness.hub.open(ChannelAddress::new("c2"));
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/connections",
            &token,
            serde_json::json!({ "channel_address": "c2" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/scores",
            &token,
            serde_json::json!({ "score": 500 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    // The record is durable but unranked: the leaderboard stays empty.
    let response = app
        .oneshot(request("GET", "/v1/leaderboard/leader"))
        .await
        .expect("response");
    let body = read_json(response).await;
    assert!(body["user_id"].is_null());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

// One broken channel out of three: two deliveries succeed and the
// submission still reports success.
#[tokio::test]
async fn partial_delivery_failure_never_fails_the_submission() {
    let harness = harness();
    let app = build_router(harness.state);
    let token = harness.issuer.mint("u3", "carol").expect("mint");

    let mut rx1 = harness.hub.open(ChannelAddress::new("c1"));
    let _rx2 = harness.hub.open(ChannelAddress::new("c2"));
    let mut rx3 = harness.hub.open(ChannelAddress::new("c3"));
    for channel in ["c1", "c2", "c3"] {
        let response = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/v1/connections",
                &token,
                serde_json::json!({ "channel_address": channel }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
    // The transport loses c2 without any disconnect reaching the registry.
    harness.hub.close(&ChannelAddress::new("c2"));

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/scores",
            &token,
            serde_json::json!({ "score": 1200 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    assert!(rx1.try_recv().is_ok());
    assert!(rx3.try_recv().is_ok());
}

// A channel closed through the API stops receiving pushes; the survivor
// still gets one.
#[tokio::test]
async fn disconnected_channels_receive_no_push() {
    let harness = harness();
    let app = build_router(harness.state);
    let token = harness.issuer.mint("u4", "dave").expect("mint");

    let mut rx1 = harness.hub.open(ChannelAddress::new("c1"));
    let mut rx2 = harness.hub.open(ChannelAddress::new("c2"));
    for channel in ["c1", "c2"] {
        let response = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/v1/connections",
                &token,
                serde_json::json!({ "channel_address": channel }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app
        .clone()
        .oneshot(request("DELETE", "/v1/connections/c2"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/v1/scores",
            &token,
            serde_json::json!({ "score": 3000 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    assert!(rx1.try_recv().is_ok());
    assert!(matches!(rx2.try_recv(), Err(TryRecvError::Empty)));
}
