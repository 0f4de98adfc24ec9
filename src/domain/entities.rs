//! Domain entities. Pure data structures for the core business.
//!
//! No WhatsApp/IO types here. Adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single inbound message delivered by the webhook. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Sender identifier (WhatsApp `wa_id`). Replies are addressed here.
    pub from: String,
    /// Provider message id, used for mark-as-read and reply threading.
    pub message_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: InboundKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Text {
        body: String,
    },
    /// A tapped reply button. The title is the lookup key; the id is informational.
    InteractiveReply {
        option_id: Option<String>,
        option_title: String,
    },
    /// Any other message type (image, sticker, location, ...). Carries the provider type name.
    Other(String),
}

/// Contact information that accompanies an inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderProfile {
    /// Profile display name, if the user shared one.
    pub name: Option<String>,
    /// Stable sender identifier. Fallback display name and state-store key.
    pub wa_id: String,
}

/// Which multi-step flow (if any) a sender is in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    /// No active flow.
    #[default]
    Idle,
    Appointment {
        step: AppointmentStep,
        draft: AppointmentDraft,
    },
    /// `step` may be absent; an absent step behaves as [`AssistantStep::Question`].
    Assistant { step: Option<AssistantStep> },
}

impl ConversationState {
    pub fn is_active(&self) -> bool {
        !matches!(self, ConversationState::Idle)
    }
}

/// Steps of the appointment flow that wait for user input. Entry and completion are transitions,
/// not stored steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStep {
    Name,
    PetName,
    PetType,
    Reason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantStep {
    Question,
}

/// Appointment fields collected so far, in the order they are asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub name: Option<String>,
    pub pet_name: Option<String>,
    pub pet_type: Option<String>,
    pub reason: Option<String>,
}

/// A completed booking, handed to the appointment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub sender_id: String,
    pub name: String,
    pub pet_name: String,
    pub pet_type: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Media keywords a user can type to receive a sample file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Image,
    Video,
    Document,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Audio,
        MediaKind::Image,
        MediaKind::Video,
        MediaKind::Document,
    ];

    /// Exact keyword match on already-normalized text.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "audio" => Some(MediaKind::Audio),
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "document" => Some(MediaKind::Document),
            _ => None,
        }
    }

    /// Provider message type name.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCatalogEntry {
    pub url: String,
    pub caption: String,
}

/// One reply button: stable id plus visible title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub title: String,
}

/// A reply produced by the core, consumed by the messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundReply {
    Text {
        body: String,
        reply_to: Option<String>,
    },
    Buttons {
        prompt: String,
        options: Vec<Button>,
    },
    Media {
        kind: MediaKind,
        url: String,
        caption: String,
    },
}

impl OutboundReply {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundReply::Text {
            body: body.into(),
            reply_to: None,
        }
    }

    pub fn text_reply_to(body: impl Into<String>, message_id: &str) -> Self {
        OutboundReply::Text {
            body: body.into(),
            reply_to: Some(message_id.to_string()),
        }
    }
}
