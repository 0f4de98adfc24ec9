//! Inbound port. The webhook (adapter) calls into the application.

use crate::domain::{DomainError, InboundEvent, SenderProfile};

/// Input port: invoked once per inbound webhook message.
#[async_trait::async_trait]
pub trait InboundPort: Send + Sync {
    /// Classify the event, run the matching reply or flow step, and acknowledge it.
    async fn handle(&self, event: InboundEvent, profile: SenderProfile) -> Result<(), DomainError>;
}
