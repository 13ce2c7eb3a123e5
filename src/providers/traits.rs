use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::RelayError;
use crate::store::Platform;

/// A set of tokens returned from a token endpoint after code exchange or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    /// HighLevel scopes its tokens to a location and reports it here.
    #[serde(rename = "locationId")]
    pub location_id: Option<String>,
}

/// Trait implemented by both platforms' OAuth token endpoints.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Which token record this provider owns.
    fn platform(&self) -> Platform;

    /// Human-readable name used in logs and pages.
    fn display_name(&self) -> &str;

    /// Scopes requested in the authorization URL.
    fn scopes(&self) -> Vec<String> {
        vec![]
    }

    /// Authorization URL the operator's browser is redirected to.
    fn auth_url(&self) -> String;

    /// Exchange an authorization code for an access token (and refresh token).
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, RelayError>;

    /// Exchange a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, RelayError>;

    /// Lifetime assumed when the token endpoint omits `expires_in`.
    fn token_ttl(&self) -> Duration {
        Duration::from_secs(3600)
    }
}
