//! Intent classifier. Decides what an inbound event asks for.
//!
//! Pure: the same event and state snapshot always yield the same [`Action`].

use crate::domain::{
    AppointmentDraft, AppointmentStep, AssistantStep, ConversationState, InboundEvent, InboundKind,
    MediaKind,
};
use crate::usecases::menu::{self, MenuAction};

const GREETINGS: &[&str] = &["hola", "hello", "hi", "buenas tardes", "good afternoon"];

/// Outcome of classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Unsupported event type. No reply, no read receipt.
    Ignore,
    Greet,
    SendMedia(MediaKind),
    /// Echo the original (non-normalized) body.
    Echo(String),
    /// Free text for the active appointment flow.
    AppointmentInput {
        step: AppointmentStep,
        draft: AppointmentDraft,
        input: String,
    },
    /// Free text for the active assistant flow.
    AssistantInput {
        step: Option<AssistantStep>,
        input: String,
    },
    Menu(MenuAction),
    /// Interactive title with no menu entry. Carries the normalized title.
    UnknownOption(String),
}

/// Trim and lowercase.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn is_greeting(normalized: &str) -> bool {
    GREETINGS.contains(&normalized)
}

/// Classify an inbound event against the sender's current state.
pub fn classify(event: &InboundEvent, state: &ConversationState) -> Action {
    match &event.kind {
        InboundKind::Text { body } => classify_text(body, state),
        InboundKind::InteractiveReply { option_title, .. } => {
            menu::dispatch(&normalize(option_title))
        }
        InboundKind::Other(_) => Action::Ignore,
    }
}

fn classify_text(body: &str, state: &ConversationState) -> Action {
    // An active flow owns all free text, so "hello" mid-flow is an answer, not a greeting.
    match state {
        ConversationState::Appointment { step, draft } => {
            return Action::AppointmentInput {
                step: *step,
                draft: draft.clone(),
                input: body.to_string(),
            };
        }
        ConversationState::Assistant { step } => {
            return Action::AssistantInput {
                step: *step,
                input: body.to_string(),
            };
        }
        ConversationState::Idle => {}
    }

    let normalized = normalize(body);
    if is_greeting(&normalized) {
        Action::Greet
    } else if let Some(kind) = MediaKind::from_keyword(&normalized) {
        Action::SendMedia(kind)
    } else {
        Action::Echo(body.to_string())
    }
}
