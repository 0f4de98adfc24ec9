//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    AppointmentDraft, AppointmentRecord, AppointmentStep, AssistantStep, Button, ConversationState,
    InboundEvent, InboundKind, MediaCatalogEntry, MediaKind, OutboundReply, SenderProfile,
};
pub use errors::DomainError;
