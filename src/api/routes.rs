//! Route handlers for the relay.
//!
//! OAuth callbacks render small HTML pages for the operator completing the
//! install. Webhook routes always answer `200`: a non-2xx makes the sending
//! platform redeliver, so failures are logged here instead of returned.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::clients::Contact;
use crate::error::RelayError;
use crate::relay::{self, GhlWebhook, OutboundMessage, PodiumWebhook};
use crate::store::TokenRecord;
use crate::SharedState;

pub fn relay_router(state: SharedState) -> Router {
    Router::new()
        // ── Health ───────────────────────────────────────────────────────
        .route("/", get(home))
        .route("/status", get(status))
        // ── HighLevel OAuth ──────────────────────────────────────────────
        .route("/oauth/start", get(ghl_oauth_start))
        .route("/oauth/callback", get(ghl_oauth_callback))
        // ── Podium OAuth ─────────────────────────────────────────────────
        .route("/oauth/podium/start", get(podium_oauth_start))
        .route("/oauth/podium/callback", get(podium_oauth_callback))
        // ── Manual testing ───────────────────────────────────────────────
        .route("/test-contact", get(test_contact))
        // ── Webhooks ─────────────────────────────────────────────────────
        .route("/webhook/podium", post(podium_webhook))
        .route("/webhook/ghl", post(ghl_webhook))
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

async fn home() -> Html<&'static str> {
    Html("<h1>GHL ↔ Podium Integration Server Running</h1>")
}

async fn status(State(state): State<SharedState>) -> impl IntoResponse {
    let snapshot = state.store.snapshot();
    Json(json!({
        "status": "ok",
        "service": "ghl-podium-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "connected": {
            "ghl": snapshot.ghl.is_some() || state.config.ghl_access_token.is_some(),
            "podium": snapshot.podium.is_some(),
        },
        "location_id": snapshot.location_id.is_some(),
    }))
}

// =============================================================================
// OAuth
// =============================================================================

#[derive(Debug, Deserialize)]
struct OAuthCallbackQuery {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// GET /oauth/start: redirect to the HighLevel consent screen.
async fn ghl_oauth_start(State(state): State<SharedState>) -> Redirect {
    Redirect::temporary(&state.ghl.authorize_url())
}

/// GET /oauth/callback: exchange the HighLevel code and store the tokens.
async fn ghl_oauth_callback(
    State(state): State<SharedState>,
    Query(q): Query<OAuthCallbackQuery>,
) -> Response {
    let code = match callback_code(q, "HighLevel") {
        Ok(code) => code,
        Err(page) => return page,
    };

    match state.ghl.exchange_code_for_token(&code).await {
        Ok(record) => Html(format!(
            "<h2>✅ GHL Tokens Saved</h2><pre>{}</pre>",
            escape_html(&pretty(&record))
        ))
        .into_response(),
        Err(e) => {
            error!("HighLevel token exchange failed: {e}");
            error_page("Token Exchange Error", &e)
        }
    }
}

/// GET /oauth/podium/start: redirect to the Podium consent screen.
async fn podium_oauth_start(State(state): State<SharedState>) -> Redirect {
    Redirect::temporary(&state.podium.authorize_url())
}

/// GET /oauth/podium/callback: exchange the Podium code, then subscribe the webhook.
async fn podium_oauth_callback(
    State(state): State<SharedState>,
    Query(q): Query<OAuthCallbackQuery>,
) -> Response {
    let code = match callback_code(q, "Podium") {
        Ok(code) => code,
        Err(page) => return page,
    };

    let record = match state.podium.exchange_code_for_token(&code).await {
        Ok(record) => record,
        Err(e) => {
            error!("Podium token exchange failed: {e}");
            return error_page("Error exchanging code", &e);
        }
    };

    let access_token = record.access_token.clone().unwrap_or_default();
    let webhook_status = match state.podium.register_webhook(&access_token).await {
        Ok(_) => "webhook created successfully".to_string(),
        Err(e) => {
            error!("Error creating Podium webhook: {e}");
            format!("webhook registration failed: {}", escape_html(&e.to_string()))
        }
    };

    Html(format!(
        "<h2>✅ Podium Tokens saved, {webhook_status}</h2><pre>{}</pre>",
        escape_html(&pretty(&record))
    ))
    .into_response()
}

/// Pull the code out of a callback, or the page to show instead.
fn callback_code(q: OAuthCallbackQuery, platform: &str) -> Result<String, Response> {
    if let Some(err) = q.error {
        warn!("{platform} OAuth denied: {err}");
        let description = q.error_description.unwrap_or(err);
        return Err(Html(format!(
            "<h1>OAuth Error:</h1><p>{}</p>",
            escape_html(&description)
        ))
        .into_response());
    }

    q.code.filter(|c| !c.is_empty()).ok_or_else(|| {
        Html(format!("<h2>❌ No OAuth code received from {platform}.</h2>")).into_response()
    })
}

fn error_page(title: &str, err: &RelayError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!(
            "<h2>❌ {title}</h2><pre>{}</pre>",
            escape_html(&err.to_string())
        )),
    )
        .into_response()
}

fn pretty(record: &TokenRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_default()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Manual testing
// =============================================================================

#[derive(Debug, Deserialize)]
struct TestContactQuery {
    phone: Option<String>,
    #[serde(default)]
    name: String,
}

/// GET /test-contact?phone&name: upsert a contact by hand.
async fn test_contact(
    State(state): State<SharedState>,
    Query(q): Query<TestContactQuery>,
) -> Result<Json<Contact>, RelayError> {
    let phone = q
        .phone
        .filter(|p| !p.is_empty())
        .ok_or_else(|| RelayError::BadRequest("missing phone".into()))?;

    let contact = state.ghl.upsert_contact(&phone, &q.name).await?;
    Ok(Json(contact))
}

// =============================================================================
// Webhooks
// =============================================================================

/// POST /webhook/podium: Podium → HighLevel.
async fn podium_webhook(State(state): State<SharedState>, body: Bytes) -> StatusCode {
    let webhook: PodiumWebhook = match serde_json::from_slice(&body) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!("Podium webhook with unreadable payload, ignoring: {e}");
            return StatusCode::OK;
        }
    };
    info!("Podium webhook received");
    debug!(?webhook, "Podium webhook payload");

    if let Err(e) = relay::relay_inbound(&state.ghl, webhook).await {
        error!("Podium webhook error: {e}");
    }

    StatusCode::OK
}

/// POST /webhook/ghl: HighLevel → Podium.
async fn ghl_webhook(State(state): State<SharedState>, body: Bytes) -> StatusCode {
    let webhook: GhlWebhook = match serde_json::from_slice(&body) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!("HighLevel webhook with unreadable payload, ignoring: {e}");
            return StatusCode::OK;
        }
    };
    info!("HighLevel webhook received");
    debug!(?webhook, "HighLevel webhook payload");

    let message = match OutboundMessage::try_from(webhook) {
        Ok(message) => message,
        Err(e) => {
            warn!("HighLevel webhook ignored: {e}");
            return StatusCode::OK;
        }
    };

    if let Err(e) = relay::relay_outbound(&state.ghl, &state.podium, message).await {
        error!("Podium send error: {e}");
    }

    StatusCode::OK
}
