//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Webhook payload that does not describe a message we can classify.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Media keyword missing from the catalog. Unreachable through the classifier.
    #[error("Unknown media kind: {0}")]
    UnknownMediaKind(String),

    #[error("Messaging transport error: {0}")]
    Transport(String),

    #[error("Assistant error: {0}")]
    Assistant(String),

    #[error("Appointment log error: {0}")]
    AppointmentLog(String),
}
