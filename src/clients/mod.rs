//! Authenticated API clients for the two platforms.
//!
//! Each client owns its OAuth provider and a handle to the shared token
//! store, and obtains a valid access token before every call.

mod ghl;
mod podium;

pub use ghl::{Contact, GhlClient};
pub use podium::PodiumClient;

use serde_json::Value;

use crate::error::RelayError;

/// Parse a downstream response: non-2xx becomes `RemoteApi`, an empty body `null`.
async fn read_json(resp: reqwest::Response) -> Result<Value, RelayError> {
    if !resp.status().is_success() {
        return Err(RelayError::from_response(resp).await);
    }

    let text = resp
        .text()
        .await
        .map_err(|e| RelayError::Transport(format!("Failed to read response body: {e}")))?;

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text)
        .map_err(|e| RelayError::Decode(format!("response is not JSON: {e}")))
}
