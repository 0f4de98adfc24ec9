//! Mock assistant adapter for running without an API key.
//!
//! Returns a canned answer for development and testing purposes.

use crate::domain::DomainError;
use crate::ports::AssistantPort;
use std::time::Duration;
use tracing::info;

/// Mock assistant.
///
/// Returns a predetermined answer without making API calls.
/// Simulates network latency with configurable delay.
pub struct MockAssistantAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAssistantAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockAssistantAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AssistantPort for MockAssistantAdapter {
    async fn answer(&self, question: &str) -> Result<String, DomainError> {
        info!(
            question_len = question.len(),
            "[MOCK] Simulating assistant answer"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        Ok(format!(
            "[MOCK] Thanks for your question (\"{}\"). Our veterinary team will review it; \
             in the meantime keep your pet calm, hydrated and comfortable.",
            question.trim()
        ))
    }
}
