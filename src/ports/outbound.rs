//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AppointmentRecord, Button, ConversationState, DomainError, MediaKind};

/// Messaging provider gateway. Sends replies and read receipts.
///
/// Implementations do not retry; the caller decides what a failed send means.
#[async_trait::async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a plain text message. `reply_to` threads it under an inbound message.
    async fn send_text(
        &self,
        to: &str,
        body: &str,
        reply_to: Option<&str>,
    ) -> Result<(), DomainError>;

    /// Send a prompt with reply buttons, in order. The provider caps the number of buttons.
    async fn send_interactive_buttons(
        &self,
        to: &str,
        prompt: &str,
        options: &[Button],
    ) -> Result<(), DomainError>;

    /// Send a media file by public link.
    async fn send_media(
        &self,
        to: &str,
        kind: MediaKind,
        url: &str,
        caption: &str,
    ) -> Result<(), DomainError>;

    /// Mark an inbound message as read.
    async fn mark_read(&self, message_id: &str) -> Result<(), DomainError>;
}

/// Q&A collaborator. Answers a free-text question.
#[async_trait::async_trait]
pub trait AssistantPort: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String, DomainError>;
}

/// Per-sender conversation state, keyed by sender identifier.
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Current state for a sender. Returns `Idle` if absent.
    async fn get(&self, sender_id: &str) -> Result<ConversationState, DomainError>;

    async fn set(&self, sender_id: &str, state: ConversationState) -> Result<(), DomainError>;

    async fn clear(&self, sender_id: &str) -> Result<(), DomainError>;
}

/// Sink for completed appointments.
#[async_trait::async_trait]
pub trait AppointmentLogPort: Send + Sync {
    async fn record(&self, appointment: &AppointmentRecord) -> Result<(), DomainError>;
}

/// Operator-facing diagnostics. Not user-visible.
pub trait DiagnosticsPort: Send + Sync {
    fn warn(&self, message: &str);
}
