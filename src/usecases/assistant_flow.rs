//! Assistant (Q&A) flow. A single `question` step answered by the assistant collaborator.

use crate::domain::{AssistantStep, ConversationState, OutboundReply};
use crate::ports::AssistantPort;
use crate::usecases::menu;
use crate::usecases::replies::ASSISTANT_UNAVAILABLE_TEXT;
use tracing::warn;

pub const REQUEST_PROMPT: &str = "What is your request?";

/// Replies for one turn plus the state to persist afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub replies: Vec<OutboundReply>,
    pub next: ConversationState,
}

/// Start the flow: ask for the question.
pub fn enter() -> Turn {
    Turn {
        replies: vec![OutboundReply::text(REQUEST_PROMPT)],
        next: ConversationState::Assistant {
            step: Some(AssistantStep::Question),
        },
    }
}

/// Answer `question` and put the top-level menu back in front of the user.
///
/// `step` may be absent; it is treated as [`AssistantStep::Question`]. An assistant failure
/// degrades to an apology text, the menu is still sent.
pub async fn answer(
    assistant: &dyn AssistantPort,
    step: Option<AssistantStep>,
    question: &str,
) -> Turn {
    let body = match step.unwrap_or(AssistantStep::Question) {
        AssistantStep::Question => match assistant.answer(question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "assistant failed to answer");
                ASSISTANT_UNAVAILABLE_TEXT.to_string()
            }
        },
    };
    Turn {
        replies: vec![OutboundReply::text(body), menu::main_menu()],
        next: ConversationState::Idle,
    }
}
