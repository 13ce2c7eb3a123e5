use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use super::read_json;
use crate::config::Config;
use crate::error::RelayError;
use crate::providers::{OAuthProvider, PodiumProvider};
use crate::relay::MessagingApi;
use crate::store::{self, TokenRecord, TokenStore};

/// Event Podium fires when a customer texts the location.
pub const MESSAGE_RECEIVED_EVENT: &str = "message.received";

#[derive(Debug, Serialize)]
struct Channel<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    identifier: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    channel: Channel<'a>,
    set_open_inbox: bool,
    body: &'a str,
    contact_name: &'a str,
    location_uid: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateWebhookRequest<'a> {
    location_uid: Option<&'a str>,
    url: &'a str,
    event_types: Vec<&'static str>,
}

/// Podium (messaging) API client.
pub struct PodiumClient {
    provider: PodiumProvider,
    store: Arc<TokenStore>,
    http: reqwest::Client,
    base_url: String,
    location_id: Option<String>,
    webhook_url: String,
}

impl PodiumClient {
    pub fn new(config: &Config, store: Arc<TokenStore>, http: reqwest::Client) -> Self {
        let provider = PodiumProvider::new(
            config.podium_client_id.clone(),
            config.podium_client_secret.clone(),
            config.podium_redirect_uri.clone(),
            config.podium_token_url.clone(),
            http.clone(),
        );

        Self {
            provider,
            store,
            http,
            base_url: config.podium_base_url.trim_end_matches('/').to_string(),
            location_id: config.podium_location_id.clone(),
            webhook_url: config.podium_webhook_url(),
        }
    }

    pub fn authorize_url(&self) -> String {
        self.provider.auth_url()
    }

    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenRecord, RelayError> {
        let (record, _) = store::exchange_and_store(&self.store, &self.provider, code).await?;
        Ok(record)
    }

    pub async fn refresh_access_token(&self) -> Result<String, RelayError> {
        store::ensure_access_token(&self.store, &self.provider).await
    }

    /// Send an SMS to `phone_number` (E.164) from the configured location.
    pub async fn send_message(
        &self,
        phone_number: &str,
        message: &str,
        contact_name: &str,
    ) -> Result<Value, RelayError> {
        let token = self.refresh_access_token().await?;
        let payload = SendMessageRequest {
            channel: Channel {
                kind: "phone",
                identifier: phone_number,
            },
            set_open_inbox: false,
            body: message,
            contact_name,
            location_uid: self.location_id.as_deref(),
        };

        let resp = self
            .http
            .post(format!("{}/messages", self.base_url))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Podium request failed: {e}")))?;

        let sent = read_json(resp).await.inspect_err(|e| {
            error!("Podium send error: {e}");
        })?;
        info!("Podium message sent to {phone_number}");
        Ok(sent)
    }

    /// Subscribe this relay's inbound webhook to `message.received` events.
    ///
    /// Takes the token explicitly: it runs right after the code exchange,
    /// with the token that exchange just produced.
    pub async fn register_webhook(&self, access_token: &str) -> Result<Value, RelayError> {
        let payload = CreateWebhookRequest {
            location_uid: self.location_id.as_deref(),
            url: &self.webhook_url,
            event_types: vec![MESSAGE_RECEIVED_EVENT],
        };

        let resp = self
            .http
            .post(format!("{}/webhooks", self.base_url))
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Podium request failed: {e}")))?;

        let created = read_json(resp).await?;
        info!("Podium webhook created for {}", self.webhook_url);
        Ok(created)
    }
}

#[async_trait]
impl MessagingApi for PodiumClient {
    async fn send_message(
        &self,
        phone_number: &str,
        message: &str,
        contact_name: &str,
    ) -> Result<(), RelayError> {
        PodiumClient::send_message(self, phone_number, message, contact_name)
            .await
            .map(|_| ())
    }
}
