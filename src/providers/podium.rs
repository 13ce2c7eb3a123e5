use async_trait::async_trait;
use std::time::Duration;

use super::traits::{OAuthProvider, TokenSet};
use super::{post_token_form, urlencoding};
use crate::error::RelayError;
use crate::store::Platform;

const AUTHORIZE_URL: &str = "https://api.podium.com/oauth/authorize";

/// Podium OAuth 2.0 provider.
///
/// Scopes are space-separated. Access tokens last 10 hours and the refresh
/// token may or may not be rotated.
pub struct PodiumProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    http: reqwest::Client,
}

impl PodiumProvider {
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
impl OAuthProvider for PodiumProvider {
    fn platform(&self) -> Platform {
        Platform::Podium
    }

    fn display_name(&self) -> &str {
        "Podium"
    }

    fn scopes(&self) -> Vec<String> {
        vec![
            "read_messages".into(),
            "write_messages".into(),
            "read_contacts".into(),
            "write_contacts".into(),
        ]
    }

    fn auth_url(&self) -> String {
        let scope_str = self.scopes().join(" ");
        format!(
            "{AUTHORIZE_URL}?\
             client_id={client_id}\
             &redirect_uri={redirect_uri}\
             &response_type=code\
             &scope={scope}",
            client_id = urlencoding(&self.client_id),
            redirect_uri = urlencoding(&self.redirect_uri),
            scope = urlencoding(&scope_str),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, RelayError> {
        post_token_form(
            &self.http,
            &self.token_url,
            self.display_name(),
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
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
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ],
        )
        .await
    }

    fn token_ttl(&self) -> Duration {
        Duration::from_secs(10 * 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_url_requests_message_and_contact_scopes() {
        let provider = PodiumProvider::new(
            "pod-client".into(),
            "secret".into(),
            "https://relay.example.com/oauth/podium/callback".into(),
            "https://api.podium.com/oauth/token".into(),
            reqwest::Client::new(),
        );
        let url = provider.auth_url();
        assert!(url.starts_with("https://api.podium.com/oauth/authorize?client_id=pod-client"));
        assert!(url.contains("&response_type=code"));
        assert!(url.ends_with(
            "&scope=read_messages+write_messages+read_contacts+write_contacts"
        ));
    }
}
