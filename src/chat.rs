//! Chat-completion client for the local model endpoint
//!
//! Sends the running history as a single non-streaming request to an
//! Ollama-style `/api/chat` endpoint and extracts the reply text. History
//! mutation is the orchestrator's job; this client only talks HTTP.

use std::time::Duration;

use crate::error::ChatError;
use crate::history::{ConversationHistory, ConversationMessage};

/// Request body for the chat endpoint
#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationMessage],
    stream: bool,
}

/// Response envelope from the chat endpoint
#[derive(serde::Deserialize)]
struct ChatResponse {
    message: Option<ReplyMessage>,
}

#[derive(serde::Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Client for a local chat-completion endpoint
pub struct ChatClient {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl ChatClient {
    /// Create a client with a bounded per-request timeout
    ///
    /// The timeout is generous because local models can take tens of
    /// seconds to produce a full reply.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(url: String, model: String, timeout: Duration) -> Result<Self, ChatError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { client, url, model })
    }

    /// Send the full history and return the assistant's reply text
    ///
    /// One attempt, no retries. Does not mutate the history.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-2xx status, or a response
    /// missing the reply field
    pub fn complete(&self, history: &ConversationHistory) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: &self.model,
            messages: history.messages(),
            stream: false,
        };

        tracing::debug!(
            url = %self.url,
            model = %self.model,
            messages = history.len(),
            "sending chat request"
        );

        let response = self.client.post(&self.url).json(&request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(%status, body = %body, "chat endpoint error");
            return Err(ChatError::BadStatus { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        let reply = parsed
            .message
            .map(|m| m.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                ChatError::MalformedResponse("response has no message.content".to_string())
            })?;

        tracing::info!(chars = reply.len(), "chat reply received");
        Ok(reply)
    }
}
