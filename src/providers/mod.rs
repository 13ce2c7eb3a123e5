mod ghl;
mod podium;
mod traits;

pub use ghl::GhlProvider;
pub use podium::PodiumProvider;
pub use traits::{OAuthProvider, TokenSet};

use crate::error::RelayError;

/// POST a form-encoded grant to a token endpoint and parse the token set.
///
/// Both platforms speak plain OAuth 2.0 here, so exchange and refresh differ
/// only in the form fields.
async fn post_token_form(
    http: &reqwest::Client,
    token_url: &str,
    provider: &str,
    form: &[(&str, &str)],
) -> Result<TokenSet, RelayError> {
    let resp = http
        .post(token_url)
        .form(form)
        .send()
        .await
        .map_err(|e| RelayError::Transport(format!("{provider} token request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(RelayError::Auth(format!(
            "{provider} token endpoint returned {status}: {body}"
        )));
    }

    resp.json()
        .await
        .map_err(|e| RelayError::Auth(format!("Failed to parse {provider} token response: {e}")))
}

/// Simple percent-encoding for URL parameters.
fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
