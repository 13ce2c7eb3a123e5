use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::read_json;
use crate::config::Config;
use crate::error::RelayError;
use crate::providers::{GhlProvider, OAuthProvider};
use crate::relay::CrmApi;
use crate::store::{self, TokenRecord, TokenStore};

/// API version header HighLevel requires on every request.
pub const API_VERSION: &str = "2021-07-28";

/// A HighLevel contact. Only the fields the relay reads are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Contact {
    /// First and last name joined by a space, or the full `name` when both are blank.
    pub fn display_name(&self) -> String {
        let joined = [&self.first_name, &self.last_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if joined.is_empty() {
            self.name.clone().unwrap_or_default()
        } else {
            joined
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContactEnvelope {
    contact: Contact,
}

/// HighLevel (CRM) API client.
pub struct GhlClient {
    provider: GhlProvider,
    store: Arc<TokenStore>,
    http: reqwest::Client,
    api_base: String,
    override_token: Option<String>,
    conversation_provider_id: String,
}

impl GhlClient {
    pub fn new(config: &Config, store: Arc<TokenStore>, http: reqwest::Client) -> Self {
        let provider = GhlProvider::new(
            config.ghl_client_id.clone(),
            config.ghl_client_secret.clone(),
            config.ghl_redirect_uri.clone(),
            config.ghl_token_url(),
            http.clone(),
        );

        Self {
            provider,
            store,
            http,
            api_base: config.ghl_api_base.trim_end_matches('/').to_string(),
            override_token: config.ghl_access_token.clone(),
            conversation_provider_id: config.ghl_conversation_provider_id.clone(),
        }
    }

    pub fn authorize_url(&self) -> String {
        self.provider.auth_url()
    }

    /// Exchange an OAuth code, persist the tokens and the installed location id.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenRecord, RelayError> {
        let (record, tokens) = store::exchange_and_store(&self.store, &self.provider, code).await?;

        if let Some(location_id) = tokens.location_id.as_deref().filter(|id| !id.is_empty()) {
            self.store.save_location_id(location_id);
            info!("HighLevel location id saved: {location_id}");
        }

        Ok(record)
    }

    /// A valid access token. The configured override wins over anything stored.
    pub async fn refresh_access_token(&self) -> Result<String, RelayError> {
        if let Some(token) = &self.override_token {
            return Ok(token.clone());
        }
        store::ensure_access_token(&self.store, &self.provider).await
    }

    /// Generic authenticated call against the HighLevel API.
    pub async fn call_api(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, RelayError> {
        let token = self.refresh_access_token().await?;
        let url = format!("{}{}", self.api_base, endpoint);
        debug!(%method, %url, ?body, "HighLevel request");

        let mut req = self
            .http
            .request(method, &url)
            .bearer_auth(token)
            .header("Version", API_VERSION)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("HighLevel request failed: {e}")))?;

        read_json(resp).await.inspect_err(|e| {
            error!("HighLevel error on {endpoint}: {e}");
        })
    }

    /// Create or update the contact keyed by `phone` in the stored location.
    pub async fn upsert_contact(&self, phone: &str, name: &str) -> Result<Contact, RelayError> {
        let location_id = self.store.location_id().ok_or_else(|| {
            RelayError::Config(
                "Missing locationId in token store. Ensure HighLevel OAuth completed.".into(),
            )
        })?;

        let body = json!({
            "locationId": location_id,
            "phone": phone,
            "name": name,
        });
        let resp = self
            .call_api("/contacts/upsert", Method::POST, Some(&body))
            .await?;
        parse_contact(resp)
    }

    /// Record `message` as an inbound SMS on the contact's conversation.
    pub async fn inject_inbound_message(
        &self,
        contact_id: &str,
        message: &str,
    ) -> Result<Value, RelayError> {
        let body = json!({
            "type": "SMS",
            "conversationProviderId": self.conversation_provider_id,
            "contactId": contact_id,
            "message": message,
            "direction": "inbound",
            "date": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        self.call_api("/conversations/messages/inbound", Method::POST, Some(&body))
            .await
    }

    pub async fn get_contact(&self, contact_id: &str) -> Result<Contact, RelayError> {
        let resp = self
            .call_api(&format!("/contacts/{contact_id}"), Method::GET, None)
            .await?;
        parse_contact(resp)
    }
}

fn parse_contact(resp: Value) -> Result<Contact, RelayError> {
    serde_json::from_value::<ContactEnvelope>(resp)
        .map(|envelope| envelope.contact)
        .map_err(|e| RelayError::Decode(format!("HighLevel contact response: {e}")))
}

#[async_trait]
impl CrmApi for GhlClient {
    async fn upsert_contact(&self, phone: &str, name: &str) -> Result<Contact, RelayError> {
        GhlClient::upsert_contact(self, phone, name).await
    }

    async fn inject_inbound_message(
        &self,
        contact_id: &str,
        message: &str,
    ) -> Result<(), RelayError> {
        GhlClient::inject_inbound_message(self, contact_id, message)
            .await
            .map(|_| ())
    }

    async fn get_contact(&self, contact_id: &str) -> Result<Contact, RelayError> {
        GhlClient::get_contact(self, contact_id).await
    }
}
