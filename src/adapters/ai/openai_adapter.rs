//! OpenAI-compatible adapter for the Q&A assistant.
//!
//! Supports OpenAI API, Azure OpenAI, and local Ollama instances.
//! Implements `AssistantPort` with a fixed pet-shop customer service prompt.

use crate::domain::DomainError;
use crate::ports::AssistantPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// OpenAI-compatible assistant adapter.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4o-mini", "llama3.2")
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    fn system_prompt() -> &'static str {
        r#"You are part of the customer service team of Medpet, an online veterinary pet shop.
Answer the customer's question about their pet as simply and clearly as possible, in a single
short message, in plain text without markdown. Do not ask follow-up questions and do not
start a conversation. If the question describes an emergency, tell the customer to call our
attention line right away. If the question is not about pets or pet care, politely say that
you can only help with pet-related questions."#
    }

    fn build_request(&self, question: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            temperature: 0.3,
        }
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

fn first_answer(response: ChatResponse) -> Result<String, DomainError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::Assistant("No response choices returned".to_string()))
}

#[async_trait::async_trait]
impl AssistantPort for OpenAiAdapter {
    async fn answer(&self, question: &str) -> Result<String, DomainError> {
        info!(
            question_len = question.len(),
            model = %self.model,
            "sending question to assistant"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(question))
            .send()
            .await
            .map_err(|e| DomainError::Assistant(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "assistant API returned error");
            return Err(DomainError::Assistant(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Assistant(format!("Failed to parse API response: {}", e)))?;

        let answer = first_answer(chat_response)?;
        debug!(answer_len = answer.len(), "received assistant answer");
        Ok(answer)
    }
}
