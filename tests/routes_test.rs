mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header::LOCATION, Request, StatusCode},
    response::Response,
};
use common::{test_env, test_env_with, valid_record};
use ghl_podium_relay::api;
use ghl_podium_relay::store::Platform;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{any, body_partial_json, method, path},
    Mock, ResponseTemplate,
};

async fn get(env: &common::TestEnv, uri: &str) -> Response {
    api::router(env.state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(env: &common::TestEnv, uri: &str, body: Value) -> Response {
    post_raw(env, uri, body.to_string()).await
}

async fn post_raw(env: &common::TestEnv, uri: &str, body: String) -> Response {
    api::router(env.state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Health & OAuth
// =============================================================================

#[tokio::test]
async fn test_home_and_status() {
    let env = test_env().await;

    let resp = get(&env, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Integration Server Running"));

    env.state.store.save(Platform::Podium, &valid_record("pod-at"));
    let resp = get(&env, "/status").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(status["connected"]["podium"], true);
    assert_eq!(status["connected"]["ghl"], false);
    assert_eq!(status["location_id"], false);
}

#[tokio::test]
async fn test_oauth_start_redirects() {
    let env = test_env().await;

    let resp = get(&env, "/oauth/start").await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = resp.headers()[LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://app.gohighlevel.com/oauth/authorize?"));
    assert!(location.contains("client_id=ghl-client"));

    let resp = get(&env, "/oauth/podium/start").await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = resp.headers()[LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://api.podium.com/oauth/authorize?"));
}

#[tokio::test]
async fn test_oauth_callback_provider_error_page() {
    let env = test_env().await;

    let resp = get(
        &env,
        "/oauth/callback?error=access_denied&error_description=User%20denied",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("User denied"));

    let resp = get(&env, "/oauth/callback").await;
    assert!(body_text(resp).await.contains("No OAuth code"));
}

#[tokio::test]
async fn test_oauth_callback_exchange_failure_is_500() {
    let env = test_env().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
        .mount(&env.ghl)
        .await;

    let resp = get(&env, "/oauth/callback?code=abc").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(resp).await.contains("bad client"));
}

#[tokio::test]
async fn test_podium_callback_survives_webhook_failure() {
    let env = test_env().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "pod-at",
            "refresh_token": "pod-rt",
            "expires_in": 36000
        })))
        .mount(&env.podium)
        .await;

    Mock::given(method("POST"))
        .and(path("/webhooks"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&env.podium)
        .await;

    let resp = get(&env, "/oauth/podium/callback?code=abc").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("webhook registration failed"));
    assert_eq!(
        env.state.store.load(Platform::Podium).access_token.as_deref(),
        Some("pod-at")
    );
}

#[tokio::test]
async fn test_test_contact_requires_phone() {
    let env = test_env().await;
    let resp = get(&env, "/test-contact?name=Jane").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Webhooks
// =============================================================================

#[tokio::test]
async fn test_podium_webhook_forwards_to_ghl() {
    let env = test_env_with(|c| c.ghl_access_token = Some("manual-token".into())).await;
    env.state.store.save_location_id("loc_1");

    Mock::given(method("POST"))
        .and(path("/contacts/upsert"))
        .and(body_partial_json(json!({ "phone": "+15551234567", "name": "Jane" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contact": { "id": "contact-7" }
        })))
        .expect(1)
        .mount(&env.ghl)
        .await;

    Mock::given(method("POST"))
        .and(path("/conversations/messages/inbound"))
        .and(body_partial_json(json!({ "contactId": "contact-7", "message": "hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&env.ghl)
        .await;

    let resp = post_json(
        &env,
        "/webhook/podium",
        json!({
            "data": {
                "conversation": { "channel": { "identifier": "+15551234567" } },
                "body": "hi",
                "contactName": "Jane"
            }
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_podium_webhook_with_unexpected_contact_uses_default_name() {
    let env = test_env_with(|c| c.ghl_access_token = Some("manual-token".into())).await;
    env.state.store.save_location_id("loc_1");

    Mock::given(method("POST"))
        .and(path("/contacts/upsert"))
        .and(body_partial_json(json!({ "phone": "+15551234567", "name": "Podium User" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contact": { "id": "contact-8" }
        })))
        .expect(1)
        .mount(&env.ghl)
        .await;

    Mock::given(method("POST"))
        .and(path("/conversations/messages/inbound"))
        .and(body_partial_json(json!({ "contactId": "contact-8", "message": "hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&env.ghl)
        .await;

    let resp = post_json(
        &env,
        "/webhook/podium",
        json!({
            "data": {
                "conversation": { "channel": { "identifier": "+15551234567" } },
                "body": "hi",
                "contact": "uid-123"
            }
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_podium_webhook_without_body_makes_no_calls() {
    let env = test_env_with(|c| c.ghl_access_token = Some("manual-token".into())).await;
    env.state.store.save_location_id("loc_1");

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&env.ghl)
        .await;

    let resp = post_json(
        &env,
        "/webhook/podium",
        json!({ "data": { "conversation": { "channel": { "identifier": "+15551234567" } } } }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_podium_webhook_acknowledges_failures() {
    // No location id and no tokens: the upsert fails inside the handler.
    let env = test_env().await;

    let resp = post_json(
        &env,
        "/webhook/podium",
        json!({
            "conversation": { "channel": { "identifier": "+15551234567" } },
            "body": "hi"
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = post_raw(&env, "/webhook/podium", "not json".into()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ghl_webhook_sends_to_podium_with_contact_name() {
    let env = test_env_with(|c| c.ghl_access_token = Some("manual-token".into())).await;
    env.state.store.save(Platform::Podium, &valid_record("pod-at"));

    Mock::given(method("GET"))
        .and(path("/contacts/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contact": { "id": "c1", "firstName": "Jane", "lastName": "Doe" }
        })))
        .expect(1)
        .mount(&env.ghl)
        .await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_partial_json(json!({
            "channel": { "identifier": "+15551234567" },
            "body": "hey",
            "contactName": "Jane Doe"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&env.podium)
        .await;

    let resp = post_json(
        &env,
        "/webhook/ghl",
        json!({ "phone": "+15551234567", "message": "hey", "contactId": "c1" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ghl_webhook_acknowledges_failures() {
    let env = test_env_with(|c| c.ghl_access_token = Some("manual-token".into())).await;

    Mock::given(method("GET"))
        .and(path("/contacts/c1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&env.ghl)
        .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&env.podium)
        .await;

    let resp = post_json(
        &env,
        "/webhook/ghl",
        json!({ "phone": "+15551234567", "message": "hey", "contactId": "c1" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = post_json(&env, "/webhook/ghl", json!({ "phone": "+15551234567" })).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
