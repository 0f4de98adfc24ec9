//! Map WhatsApp webhook payloads to domain entities.
//!
//! Deserializes the Cloud API notification shape and validates each message into an
//! `InboundEvent` + `SenderProfile`, or a `MalformedEvent` error.

use crate::domain::{DomainError, InboundEvent, InboundKind, SenderProfile};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level webhook notification.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

/// `messages` change value. Status updates arrive with an empty `messages` list.
#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<WaContact>,
    #[serde(default)]
    pub messages: Vec<WaMessage>,
}

#[derive(Debug, Deserialize)]
pub struct WaContact {
    pub wa_id: Option<String>,
    pub profile: Option<WaProfile>,
}

#[derive(Debug, Deserialize)]
pub struct WaProfile {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WaMessage {
    pub from: Option<String>,
    pub id: Option<String>,
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub text: Option<WaText>,
    pub interactive: Option<WaInteractive>,
}

#[derive(Debug, Deserialize)]
pub struct WaText {
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WaInteractive {
    pub button_reply: Option<WaButtonReply>,
}

#[derive(Debug, Deserialize)]
pub struct WaButtonReply {
    pub id: Option<String>,
    pub title: Option<String>,
}

/// Every message in a notification, mapped independently. Non-`messages` changes are skipped.
pub fn inbound_messages(
    payload: &WebhookPayload,
) -> Vec<Result<(InboundEvent, SenderProfile), DomainError>> {
    payload
        .entry
        .iter()
        .flat_map(|entry| entry.changes.iter())
        .filter(|change| change.field == "messages")
        .flat_map(|change| {
            change
                .value
                .messages
                .iter()
                .map(move |msg| message_to_domain(msg, &change.value.contacts))
        })
        .collect()
}

/// Map one provider message, picking the contact that sent it.
pub fn message_to_domain(
    msg: &WaMessage,
    contacts: &[WaContact],
) -> Result<(InboundEvent, SenderProfile), DomainError> {
    let from = required(msg.from.as_deref(), "from")?;
    let message_id = required(msg.id.as_deref(), "id")?;
    let message_type = required(msg.message_type.as_deref(), "type")?;

    let kind = match message_type {
        "text" => {
            let body = msg
                .text
                .as_ref()
                .and_then(|t| t.body.clone())
                .ok_or_else(|| malformed(message_id, "text message without body"))?;
            InboundKind::Text { body }
        }
        "interactive" => {
            let reply = msg
                .interactive
                .as_ref()
                .and_then(|i| i.button_reply.as_ref())
                .ok_or_else(|| {
                    malformed(message_id, "interactive message without button_reply")
                })?;
            let option_title = reply
                .title
                .clone()
                .ok_or_else(|| malformed(message_id, "button_reply without title"))?;
            InboundKind::InteractiveReply {
                option_id: reply.id.clone(),
                option_title,
            }
        }
        other => InboundKind::Other(other.to_string()),
    };

    let timestamp = msg
        .timestamp
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    // Only the sender's own contact entry may name them; wa_id is always `from`.
    let contact = contacts.iter().find(|c| c.wa_id.as_deref() == Some(from));
    let profile = SenderProfile {
        name: contact
            .and_then(|c| c.profile.as_ref())
            .and_then(|p| p.name.clone()),
        wa_id: from.to_string(),
    };

    Ok((
        InboundEvent {
            from: from.to_string(),
            message_id: message_id.to_string(),
            timestamp,
            kind,
        },
        profile,
    ))
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, DomainError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::MalformedEvent(format!("message without `{}`", field)))
}

fn malformed(message_id: &str, reason: &str) -> DomainError {
    DomainError::MalformedEvent(format!("{}: {}", message_id, reason))
}
