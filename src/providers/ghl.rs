use async_trait::async_trait;
use std::time::Duration;

use super::traits::{OAuthProvider, TokenSet};
use super::{post_token_form, urlencoding};
use crate::error::RelayError;
use crate::store::Platform;

const AUTHORIZE_URL: &str = "https://app.gohighlevel.com/oauth/authorize";

/// HighLevel (LeadConnector) OAuth 2.0 provider.
///
/// Quirks:
/// - Scopes are fixed in the marketplace app, so the authorize URL carries none.
/// - The token response includes the `locationId` the app was installed into.
/// - Access tokens live about a day; refresh tokens rotate on every refresh.
pub struct GhlProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    http: reqwest::Client,
}

impl GhlProvider {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        token_url: String,
        http: reqwest::Client,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            token_url,
            http,
        }
    }
}

#[async_trait]
impl OAuthProvider for GhlProvider {
    fn platform(&self) -> Platform {
        Platform::Ghl
    }

    fn display_name(&self) -> &str {
        "HighLevel"
    }

    fn auth_url(&self) -> String {
        format!(
            "{AUTHORIZE_URL}?\
             response_type=code\
             &client_id={client_id}\
             &redirect_uri={redirect_uri}",
            client_id = urlencoding(&self.client_id),
            redirect_uri = urlencoding(&self.redirect_uri),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, RelayError> {
        post_token_form(
            &self.http,
            &self.token_url,
            self.display_name(),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, RelayError> {
        post_token_form(
            &self.http,
            &self.token_url,
            self.display_name(),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }

    fn token_ttl(&self) -> Duration {
        Duration::from_secs(24 * 3600)
    }
}
