use anyhow::{Context, Result};
use std::path::PathBuf;

/// Conversation provider registered for this relay in the HighLevel marketplace app.
pub const DEFAULT_GHL_CONVERSATION_PROVIDER_ID: &str = "6925fd0c527ff0b8f1e92b60";

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,

    // ── Token file ──────────────────────────────────────────────────────
    pub token_file: PathBuf,

    // ── HighLevel (CRM) ─────────────────────────────────────────────────
    pub ghl_client_id: String,
    pub ghl_client_secret: String,
    pub ghl_redirect_uri: String,
    /// Manual override. When set, every CRM call uses it verbatim.
    pub ghl_access_token: Option<String>,
    pub ghl_api_base: String,
    pub ghl_conversation_provider_id: String,

    // ── Podium (messaging) ──────────────────────────────────────────────
    pub podium_client_id: String,
    pub podium_client_secret: String,
    pub podium_redirect_uri: String,
    pub podium_base_url: String,
    pub podium_token_url: String,
    pub podium_location_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()
                .context("Invalid PORT")?,

            token_file: std::env::var("TOKEN_FILE")
                .unwrap_or_else(|_| "tokens.json".into())
                .into(),

            ghl_client_id: std::env::var("GHL_CLIENT_ID").context("GHL_CLIENT_ID is required")?,
            ghl_client_secret: std::env::var("GHL_CLIENT_SECRET")
                .context("GHL_CLIENT_SECRET is required")?,
            ghl_redirect_uri: std::env::var("GHL_REDIRECT_URI")
                .context("GHL_REDIRECT_URI is required")?,
            ghl_access_token: non_empty_var("GHL_ACCESS_TOKEN"),
            ghl_api_base: std::env::var("GHL_API_BASE")
                .unwrap_or_else(|_| "https://services.leadconnectorhq.com".into()),
            ghl_conversation_provider_id: std::env::var("GHL_CONVERSATION_PROVIDER_ID")
                .unwrap_or_else(|_| DEFAULT_GHL_CONVERSATION_PROVIDER_ID.into()),

            podium_client_id: std::env::var("PODIUM_CLIENT_ID")
                .context("PODIUM_CLIENT_ID is required")?,
            podium_client_secret: std::env::var("PODIUM_CLIENT_SECRET")
                .context("PODIUM_CLIENT_SECRET is required")?,
            podium_redirect_uri: std::env::var("PODIUM_REDIRECT_URI")
                .context("PODIUM_REDIRECT_URI is required")?,
            podium_base_url: std::env::var("PODIUM_BASE_URL")
                .unwrap_or_else(|_| "https://api.podium.com/v4".into()),
            podium_token_url: std::env::var("PODIUM_TOKEN_URL")
                .unwrap_or_else(|_| "https://api.podium.com/oauth/token".into()),
            podium_location_id: non_empty_var("PODIUM_LOCATION_ID"),
        })
    }

    /// Token endpoint of the CRM, which lives under the API base.
    pub fn ghl_token_url(&self) -> String {
        format!("{}/oauth/token", self.ghl_api_base.trim_end_matches('/'))
    }

    /// Public URL Podium should deliver inbound messages to.
    ///
    /// Derived from the Podium redirect URI: everything before `/oauth` is the
    /// externally reachable base of this service.
    pub fn podium_webhook_url(&self) -> String {
        let base = self
            .podium_redirect_uri
            .split("/oauth")
            .next()
            .unwrap_or_default();
        format!("{base}/webhook/podium")
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
