//! Implements MessagingGateway using the WhatsApp Cloud API.
//!
//! Every call is a single POST to `{base}/{version}/{phone_number_id}/messages`. No retries.

use crate::domain::{Button, DomainError, MediaKind};
use crate::ports::MessagingGateway;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// The Cloud API rejects interactive button messages with more than three buttons.
pub const MAX_REPLY_BUTTONS: usize = 3;

const DOCUMENT_FILENAME: &str = "medpet-file.pdf";

/// WhatsApp Cloud API gateway.
pub struct WhatsAppClient {
    client: Client,
    messages_url: String,
    api_token: String,
}

impl WhatsAppClient {
    /// Create a new gateway.
    ///
    /// # Arguments
    /// * `base_url` - Graph API host (e.g. "https://graph.facebook.com")
    /// * `api_version` - Graph API version (e.g. "v21.0")
    /// * `phone_number_id` - Business phone number id that sends the replies
    /// * `api_token` - Permanent or system-user access token
    pub fn new(base_url: &str, api_version: &str, phone_number_id: &str, api_token: String) -> Self {
        Self {
            client: Client::new(),
            messages_url: format!(
                "{}/{}/{}/messages",
                base_url.trim_end_matches('/'),
                api_version,
                phone_number_id
            ),
            api_token,
        }
    }

    async fn post(&self, body: Value) -> Result<(), DomainError> {
        let res = self
            .client
            .post(&self.messages_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("Request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            warn!(status = %status, body = %text, "WhatsApp API returned error");
            return Err(DomainError::Transport(format!(
                "WhatsApp API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        Ok(())
    }
}

pub(crate) fn text_payload(to: &str, body: &str, reply_to: Option<&str>) -> Value {
    let mut payload = json!({
        "messaging_product": "whatsapp",
        "to": to,
        "text": { "body": body },
    });
    if let Some(id) = reply_to {
        payload["context"] = json!({ "message_id": id });
    }
    payload
}

pub(crate) fn buttons_payload(
    to: &str,
    prompt: &str,
    options: &[Button],
) -> Result<Value, DomainError> {
    if options.is_empty() || options.len() > MAX_REPLY_BUTTONS {
        return Err(DomainError::Transport(format!(
            "interactive messages need 1 to {} buttons, got {}",
            MAX_REPLY_BUTTONS,
            options.len()
        )));
    }
    let buttons: Vec<Value> = options
        .iter()
        .map(|b| json!({ "type": "reply", "reply": { "id": b.id, "title": b.title } }))
        .collect();
    Ok(json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "interactive",
        "interactive": {
            "type": "button",
            "body": { "text": prompt },
            "action": { "buttons": buttons },
        },
    }))
}

pub(crate) fn media_payload(to: &str, kind: MediaKind, url: &str, caption: &str) -> Value {
    let media = match kind {
        // Audio messages do not take a caption.
        MediaKind::Audio => json!({ "link": url }),
        MediaKind::Image | MediaKind::Video => json!({ "link": url, "caption": caption }),
        MediaKind::Document => {
            json!({ "link": url, "caption": caption, "filename": DOCUMENT_FILENAME })
        }
    };
    let mut payload = json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": kind.as_str(),
    });
    payload[kind.as_str()] = media;
    payload
}

pub(crate) fn mark_read_payload(message_id: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "status": "read",
        "message_id": message_id,
    })
}

#[async_trait]
impl MessagingGateway for WhatsAppClient {
    async fn send_text(
        &self,
        to: &str,
        body: &str,
        reply_to: Option<&str>,
    ) -> Result<(), DomainError> {
        debug!(to, len = body.len(), "sending text");
        self.post(text_payload(to, body, reply_to)).await
    }

    async fn send_interactive_buttons(
        &self,
        to: &str,
        prompt: &str,
        options: &[Button],
    ) -> Result<(), DomainError> {
        debug!(to, buttons = options.len(), "sending interactive buttons");
        self.post(buttons_payload(to, prompt, options)?).await
    }

    async fn send_media(
        &self,
        to: &str,
        kind: MediaKind,
        url: &str,
        caption: &str,
    ) -> Result<(), DomainError> {
        debug!(to, kind = %kind, url, "sending media");
        self.post(media_payload(to, kind, url, caption)).await
    }

    async fn mark_read(&self, message_id: &str) -> Result<(), DomainError> {
        self.post(mark_read_payload(message_id)).await
    }
}
