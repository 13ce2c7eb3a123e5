//! Podium → HighLevel.
//!
//! Podium has delivered two payload shapes over time: the event envelope
//! `{ "data": { ... }, "metadata": { ... } }` and the bare message
//! `{ "body": "...", "conversation": { ... } }`. Both normalize to one
//! [`InboundMessage`].

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::CrmApi;
use crate::error::RelayError;

/// Name given to contacts Podium did not name.
pub const DEFAULT_CONTACT_NAME: &str = "Podium User";

/// A field of the wrong type reads as absent instead of failing the payload.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelRef {
    #[serde(default, deserialize_with = "lenient")]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationRef {
    #[serde(default, deserialize_with = "lenient")]
    pub channel: Option<ChannelRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// The message fields shared by both payload shapes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodiumMessageData {
    #[serde(default, deserialize_with = "lenient")]
    pub conversation: Option<ConversationRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact: Option<ContactRef>,
}

/// A Podium webhook delivery in either known shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PodiumWebhook {
    Wrapped { data: PodiumMessageData },
    Flat(PodiumMessageData),
}

/// Canonical inbound message handed to the CRM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub phone_number: String,
    pub body: String,
    pub contact_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Not a customer message (test ping, status event, ...).
    Ignored,
    Forwarded { contact_id: String },
}

impl PodiumWebhook {
    pub fn data(&self) -> &PodiumMessageData {
        match self {
            PodiumWebhook::Wrapped { data } => data,
            PodiumWebhook::Flat(data) => data,
        }
    }

    /// `None` when the delivery lacks a phone number or a body.
    pub fn into_message(self) -> Option<InboundMessage> {
        let data = match self {
            PodiumWebhook::Wrapped { data } => data,
            PodiumWebhook::Flat(data) => data,
        };

        let phone_number = data
            .conversation
            .and_then(|c| c.channel)
            .and_then(|ch| ch.identifier)
            .filter(|p| !p.is_empty())?;
        let body = data.body.filter(|b| !b.is_empty())?;
        let contact_name = data
            .contact_name
            .filter(|n| !n.is_empty())
            .or_else(|| data.contact.and_then(|c| c.name).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| DEFAULT_CONTACT_NAME.to_string());

        Some(InboundMessage {
            phone_number,
            body,
            contact_name,
        })
    }
}

/// Upsert the sender in the CRM, then inject the message on that contact.
///
/// Every delivery is processed on its own; repeats are not deduplicated.
pub async fn relay_inbound<C>(crm: &C, webhook: PodiumWebhook) -> Result<InboundOutcome, RelayError>
where
    C: CrmApi + ?Sized,
{
    let Some(message) = webhook.into_message() else {
        warn!("Podium webhook missing phone/message, ignoring");
        return Ok(InboundOutcome::Ignored);
    };

    let contact = crm
        .upsert_contact(&message.phone_number, &message.contact_name)
        .await?;
    crm.inject_inbound_message(&contact.id, &message.body).await?;

    info!("Podium message forwarded to HighLevel contact {}", contact.id);
    Ok(InboundOutcome::Forwarded {
        contact_id: contact.id,
    })
}
