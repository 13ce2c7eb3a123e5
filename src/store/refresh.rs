//! Lazy token lifecycle shared by both platform clients.
//!
//! Tokens are never refreshed in the background. Each API call first asks
//! for a valid access token; a missing or expired record is refreshed right
//! there with the stored refresh token and written back to the store.

use chrono::Utc;
use tracing::{debug, info};

use super::file::{TokenRecord, TokenStore};
use crate::error::RelayError;
use crate::providers::{OAuthProvider, TokenSet};

/// Current time as epoch milliseconds, the unit of `TokenRecord::expires_at`.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `now_ms + ttl_secs` in milliseconds, saturating at `i64::MAX`.
fn expiry_millis(now_ms: i64, ttl_secs: u64) -> i64 {
    i64::try_from(ttl_secs)
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .and_then(|ms| now_ms.checked_add(ms))
        .unwrap_or(i64::MAX)
}

/// Turn a token endpoint response into a record and persist it.
///
/// A refresh token omitted by the platform falls back to `previous_refresh`.
/// A missing `expires_in` falls back to the provider's typical TTL.
pub fn store_token_set(
    store: &TokenStore,
    provider: &dyn OAuthProvider,
    tokens: &TokenSet,
    previous_refresh: Option<String>,
) -> TokenRecord {
    let ttl_secs = tokens
        .expires_in
        .unwrap_or_else(|| provider.token_ttl().as_secs());

    let record = TokenRecord {
        access_token: Some(tokens.access_token.clone()),
        refresh_token: tokens.refresh_token.clone().or(previous_refresh),
        expires_at: Some(expiry_millis(now_millis(), ttl_secs)),
    };

    store.save(provider.platform(), &record);
    record
}

/// Exchange an authorization code and persist the resulting record.
pub async fn exchange_and_store(
    store: &TokenStore,
    provider: &dyn OAuthProvider,
    code: &str,
) -> Result<(TokenRecord, TokenSet), RelayError> {
    let tokens = provider.exchange_code(code).await?;
    let record = store_token_set(store, provider, &tokens, None);
    info!("{} tokens saved", provider.display_name());
    Ok((record, tokens))
}

/// Return a valid access token, refreshing it first if it is missing or expired.
pub async fn ensure_access_token(
    store: &TokenStore,
    provider: &dyn OAuthProvider,
) -> Result<String, RelayError> {
    let current = store.load(provider.platform());

    if !current.needs_refresh(now_millis()) {
        if let Some(token) = current.access_token {
            return Ok(token);
        }
    }

    let refresh_token = current
        .refresh_token
        .filter(|rt| !rt.is_empty())
        .ok_or_else(|| {
            RelayError::Auth(format!(
                "No refresh token available for {}",
                provider.display_name()
            ))
        })?;

    debug!("{} access token expired, refreshing", provider.display_name());
    let tokens = provider.refresh_token(&refresh_token).await?;
    let record = store_token_set(store, provider, &tokens, Some(refresh_token));
    info!("Refreshed {} access token", provider.display_name());

    record
        .access_token
        .ok_or_else(|| RelayError::Auth("refresh returned no access token".into()))
}
