//! Conversation history with a bounded window
//!
//! The history is the only state carried between turns. It holds at most
//! one leading system message plus a capped number of user/assistant
//! messages; the orchestrator appends after each successful transcription
//! and each successful model reply.

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Session-level instruction, at most one, always first
    System,
    /// Transcribed speech from the person at the microphone
    User,
    /// Reply from the language model
    Assistant,
}

/// One message in the conversation, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Message author
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ConversationMessage {
    /// Create a message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered conversation history, capped at `max_history` non-system messages
///
/// Trimming drops the oldest user/assistant messages first and always
/// retains the leading system message. Retained messages never reorder.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
    max_history: usize,
}

impl ConversationHistory {
    /// Create an empty history with the given cap
    #[must_use]
    pub const fn new(max_history: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_history,
        }
    }

    /// Create a history seeded with a system message
    #[must_use]
    pub fn with_system(max_history: usize, system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ConversationMessage::new(Role::System, system_prompt)],
            max_history,
        }
    }

    /// Append a user message and trim to the cap
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages
            .push(ConversationMessage::new(Role::User, content));
        self.trim();
    }

    /// Append an assistant message and trim to the cap
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages
            .push(ConversationMessage::new(Role::Assistant, content));
        self.trim();
    }

    /// Drop the oldest non-system messages beyond the cap
    ///
    /// The leading system message (if any) does not count toward the cap
    /// and is never dropped.
    fn trim(&mut self) {
        let system_count = usize::from(
            self.messages
                .first()
                .is_some_and(|m| m.role == Role::System),
        );

        let excess = (self.messages.len() - system_count).saturating_sub(self.max_history);
        if excess > 0 {
            self.messages
                .drain(system_count..system_count + excess);
        }
    }

    /// All messages in chronological order
    #[must_use]
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Number of retained messages, including any system message
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history holds no messages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(history: &ConversationHistory) -> Vec<Role> {
        history.messages().iter().map(|m| m.role).collect()
    }

    #[test]
    fn test_push_order() {
        let mut history = ConversationHistory::new(10);
        history.push_user("hello");
        history.push_assistant("hi there");

        assert_eq!(roles(&history), vec![Role::User, Role::Assistant]);
        assert_eq!(history.messages()[0].content, "hello");
        assert_eq!(history.messages()[1].content, "hi there");
    }

    #[test]
    fn test_trim_drops_oldest_first() {
        let mut history = ConversationHistory::new(4);
        for i in 0..3 {
            history.push_user(format!("u{i}"));
            history.push_assistant(format!("a{i}"));
        }

        // 6 pushed, cap 4: the first exchange is gone
        assert_eq!(history.len(), 4);
        let contents: Vec<_> = history
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["u1", "a1", "u2", "a2"]);
    }

    #[test]
    fn test_trim_retains_system_message() {
        let mut history = ConversationHistory::with_system(2, "be brief");
        history.push_user("one");
        history.push_assistant("two");
        history.push_user("three");

        assert_eq!(history.len(), 3);
        assert_eq!(
            roles(&history),
            vec![Role::System, Role::Assistant, Role::User]
        );
        assert_eq!(history.messages()[0].content, "be brief");
        assert_eq!(history.messages()[1].content, "two");
        assert_eq!(history.messages()[2].content, "three");
    }

    #[test]
    fn test_system_message_does_not_count_toward_cap() {
        let mut history = ConversationHistory::with_system(2, "sys");
        history.push_user("u0");
        history.push_assistant("a0");

        // system + exactly max_history non-system messages all fit
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_trim_never_reorders() {
        let mut history = ConversationHistory::with_system(5, "sys");
        for i in 0..10 {
            history.push_user(format!("u{i}"));
        }

        let contents: Vec<_> = history
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["sys", "u5", "u6", "u7", "u8", "u9"]);
    }

    #[test]
    fn test_serializes_lowercase_roles() {
        let message = ConversationMessage::new(Role::Assistant, "hi");
        let json = serde_json::to_string(&message).unwrap();

        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
