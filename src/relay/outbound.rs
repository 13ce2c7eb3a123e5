//! HighLevel → Podium.

use serde::Deserialize;
use tracing::info;

use super::{CrmApi, MessagingApi};
use crate::error::RelayError;

/// Body HighLevel's workflow webhook posts: `{ phone, message, contactId }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhlWebhook {
    pub phone: Option<String>,
    pub message: Option<String>,
    pub contact_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub phone: String,
    pub message: String,
    pub contact_id: String,
}

impl TryFrom<GhlWebhook> for OutboundMessage {
    type Error = RelayError;

    fn try_from(webhook: GhlWebhook) -> Result<Self, Self::Error> {
        fn required(value: Option<String>, field: &str) -> Result<String, RelayError> {
            value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RelayError::BadRequest(format!("missing {field}")))
        }

        Ok(OutboundMessage {
            phone: required(webhook.phone, "phone")?,
            message: required(webhook.message, "message")?,
            contact_id: required(webhook.contact_id, "contactId")?,
        })
    }
}

/// Resolve the contact's name in the CRM, then send the SMS through Podium.
///
/// Returns the display name the message was sent under.
pub async fn relay_outbound<C, M>(
    crm: &C,
    messenger: &M,
    message: OutboundMessage,
) -> Result<String, RelayError>
where
    C: CrmApi + ?Sized,
    M: MessagingApi + ?Sized,
{
    let contact = crm.get_contact(&message.contact_id).await?;
    let name = contact.display_name();

    messenger
        .send_message(&message.phone, &message.message, &name)
        .await?;

    info!("HighLevel message for contact {} sent to Podium", message.contact_id);
    Ok(name)
}
