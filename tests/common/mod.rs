#![allow(dead_code)]

use ghl_podium_relay::config::DEFAULT_GHL_CONVERSATION_PROVIDER_ID;
use ghl_podium_relay::store::{now_millis, TokenRecord};
use ghl_podium_relay::{AppState, Config, SharedState};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

/// Relay state wired to two mock platforms and a throwaway token file.
pub struct TestEnv {
    pub state: SharedState,
    pub ghl: MockServer,
    pub podium: MockServer,
    _dir: TempDir,
}

pub fn test_config(ghl_base: &str, podium_base: &str, token_file: &Path) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        token_file: token_file.to_path_buf(),
        ghl_client_id: "ghl-client".into(),
        ghl_client_secret: "ghl-secret".into(),
        ghl_redirect_uri: "https://relay.example.com/oauth/callback".into(),
        ghl_access_token: None,
        ghl_api_base: ghl_base.into(),
        ghl_conversation_provider_id: DEFAULT_GHL_CONVERSATION_PROVIDER_ID.into(),
        podium_client_id: "podium-client".into(),
        podium_client_secret: "podium-secret".into(),
        podium_redirect_uri: "https://relay.example.com/oauth/podium/callback".into(),
        podium_base_url: podium_base.into(),
        podium_token_url: format!("{podium_base}/oauth/token"),
        podium_location_id: Some("podium-loc".into()),
    }
}

pub async fn test_env_with(configure: impl FnOnce(&mut Config)) -> TestEnv {
    let ghl = MockServer::start().await;
    let podium = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut config = test_config(&ghl.uri(), &podium.uri(), &dir.path().join("tokens.json"));
    configure(&mut config);

    TestEnv {
        state: Arc::new(AppState::new(config)),
        ghl,
        podium,
        _dir: dir,
    }
}

pub async fn test_env() -> TestEnv {
    test_env_with(|_| {}).await
}

/// A record that will not need refreshing for an hour.
pub fn valid_record(access_token: &str) -> TokenRecord {
    TokenRecord {
        access_token: Some(access_token.into()),
        refresh_token: Some(format!("{access_token}-refresh")),
        expires_at: Some(now_millis() + 3_600_000),
    }
}

/// A record whose access token expired a minute ago.
pub fn expired_record(access_token: &str, refresh_token: &str) -> TokenRecord {
    TokenRecord {
        access_token: Some(access_token.into()),
        refresh_token: Some(refresh_token.into()),
        expires_at: Some(now_millis() - 60_000),
    }
}
