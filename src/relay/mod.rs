//! Directional message relays between Podium and HighLevel.
//!
//! - [`inbound`]: Podium webhook → HighLevel contact upsert + inbound message
//! - [`outbound`]: HighLevel webhook → Podium SMS
//!
//! The relays only see the platforms through [`CrmApi`] and [`MessagingApi`].

pub mod inbound;
pub mod outbound;

pub use inbound::{relay_inbound, InboundMessage, InboundOutcome, PodiumWebhook};
pub use outbound::{relay_outbound, GhlWebhook, OutboundMessage};

use async_trait::async_trait;

use crate::clients::Contact;
use crate::error::RelayError;

/// CRM operations the relays need.
#[async_trait]
pub trait CrmApi: Send + Sync {
    async fn upsert_contact(&self, phone: &str, name: &str) -> Result<Contact, RelayError>;

    async fn inject_inbound_message(
        &self,
        contact_id: &str,
        message: &str,
    ) -> Result<(), RelayError>;

    async fn get_contact(&self, contact_id: &str) -> Result<Contact, RelayError>;
}

/// Messaging operations the relays need.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn send_message(
        &self,
        phone_number: &str,
        message: &str,
        contact_name: &str,
    ) -> Result<(), RelayError>;
}
