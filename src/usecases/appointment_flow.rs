//! Appointment flow: name -> pet name -> pet type -> reason -> done.
//!
//! Pure state machine. One input per turn, one reply per step. The caller persists `next`
//! and records `completed` bookings.

use crate::domain::{
    AppointmentDraft, AppointmentRecord, AppointmentStep, ConversationState, OutboundReply,
};
use chrono::{DateTime, Utc};

pub const NAME_PROMPT: &str = "Please, could you type your name?";
pub const PET_NAME_PROMPT: &str = "What is your pet's name?";
pub const PET_TYPE_PROMPT: &str = "What type of pet do you have? for example: dog, cat, bird";
pub const REASON_PROMPT: &str = "Which is the reason for your request?";

/// Result of one flow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub reply: OutboundReply,
    pub next: ConversationState,
    pub completed: Option<AppointmentRecord>,
}

fn prompt_for(step: AppointmentStep) -> &'static str {
    match step {
        AppointmentStep::Name => NAME_PROMPT,
        AppointmentStep::PetName => PET_NAME_PROMPT,
        AppointmentStep::PetType => PET_TYPE_PROMPT,
        AppointmentStep::Reason => REASON_PROMPT,
    }
}

/// Start the flow: ask for the requester's name.
pub fn enter() -> Transition {
    Transition {
        reply: OutboundReply::text(NAME_PROMPT),
        next: ConversationState::Appointment {
            step: AppointmentStep::Name,
            draft: AppointmentDraft::default(),
        },
        completed: None,
    }
}

/// Consume one answer at `step`. Input is stored verbatim; blank input repeats the prompt.
pub fn advance(
    sender_id: &str,
    step: AppointmentStep,
    mut draft: AppointmentDraft,
    input: &str,
    now: DateTime<Utc>,
) -> Transition {
    if input.trim().is_empty() {
        return Transition {
            reply: OutboundReply::text(prompt_for(step)),
            next: ConversationState::Appointment { step, draft },
            completed: None,
        };
    }

    let value = Some(input.to_string());
    let next_step = match step {
        AppointmentStep::Name => {
            draft.name = value;
            AppointmentStep::PetName
        }
        AppointmentStep::PetName => {
            draft.pet_name = value;
            AppointmentStep::PetType
        }
        AppointmentStep::PetType => {
            draft.pet_type = value;
            AppointmentStep::Reason
        }
        AppointmentStep::Reason => {
            draft.reason = value;
            return complete(sender_id, draft, now);
        }
    };

    Transition {
        reply: OutboundReply::text(prompt_for(next_step)),
        next: ConversationState::Appointment {
            step: next_step,
            draft,
        },
        completed: None,
    }
}

fn complete(sender_id: &str, draft: AppointmentDraft, now: DateTime<Utc>) -> Transition {
    let record = AppointmentRecord {
        sender_id: sender_id.to_string(),
        name: draft.name.unwrap_or_default(),
        pet_name: draft.pet_name.unwrap_or_default(),
        pet_type: draft.pet_type.unwrap_or_default(),
        reason: draft.reason.unwrap_or_default(),
        created_at: now,
    };
    Transition {
        reply: OutboundReply::text(confirmation_text(&record)),
        next: ConversationState::Idle,
        completed: Some(record),
    }
}

pub fn confirmation_text(record: &AppointmentRecord) -> String {
    format!(
        "Thank you for scheduling your appointment.\n\
         Summary of your appointment:\n\n\
         Name: {}\n\
         Pet name: {}\n\
         Pet type: {}\n\
         Reason: {}\n\n\
         We will contact you soon to confirm the date and time of your appointment.",
        record.name, record.pet_name, record.pet_type, record.reason
    )
}
