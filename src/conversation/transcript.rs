//! Transcript storage and windowed trimming

use serde::{Deserialize, Serialize};

/// Number of non-system messages retained by trimming
pub const DEFAULT_WINDOW: usize = 6;

/// Message role, serialized lowercase for the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One transcript entry, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered message history for one logical conversation.
///
/// Either empty, or a single system message followed by alternating
/// user/assistant turns. Trimming never evicts the system anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    window: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl Transcript {
    /// Empty transcript retaining at most `window` non-system messages
    pub fn new(window: usize) -> Self {
        Self {
            messages: Vec::new(),
            window,
        }
    }

    /// Replace any prior history with a fresh system + user pair
    pub fn seed(&mut self, system: impl Into<String>, user: impl Into<String>) {
        self.messages.clear();
        self.messages.push(ChatMessage::system(system));
        self.messages.push(ChatMessage::user(user));
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Drop the oldest non-system messages once the cap is exceeded.
    ///
    /// Keeps the anchor at index 0 plus the `window` most recent messages,
    /// in order. Already-trimmed transcripts are left untouched.
    pub fn trim(&mut self) {
        if self.messages.len() > self.window + 1 {
            let tail_start = self.messages.len() - self.window;
            let mut kept = Vec::with_capacity(self.window + 1);
            kept.push(self.messages[0].clone());
            kept.extend(self.messages.iter().skip(tail_start).cloned());
            self.messages = kept;
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[allow(dead_code)] // Used in tests
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_with_history(window: usize, turns: usize) -> Transcript {
        let mut transcript = Transcript::new(window);
        transcript.seed("persona", "first question");
        for i in 0..turns {
            transcript.push_assistant(format!("answer {i}"));
            transcript.push_user(format!("question {i}"));
        }
        transcript
    }

    #[test]
    fn test_seed_discards_prior_history() {
        let mut transcript = Transcript::default();
        transcript.seed("persona", "old");
        transcript.push_assistant("reply");
        transcript.seed("persona", "new");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[1], ChatMessage::user("new"));
    }

    #[test]
    fn test_trim_below_cap_is_a_noop() {
        let mut transcript = transcript_with_history(6, 2);
        let before = transcript.clone();
        transcript.trim();
        assert_eq!(transcript, before);
    }

    #[test]
    fn test_trim_keeps_system_anchor_and_recent_tail() {
        let mut transcript = transcript_with_history(4, 5);
        let before: Vec<ChatMessage> = transcript.messages().to_vec();
        transcript.trim();

        assert_eq!(transcript.len(), 5);
        assert_eq!(transcript.messages()[0], ChatMessage::system("persona"));
        let tail: Vec<ChatMessage> = before.iter().rev().take(4).rev().cloned().collect();
        assert_eq!(&transcript.messages()[1..], tail.as_slice());
    }

    #[test]
    fn test_trim_evicts_seed_user_message_first() {
        let mut transcript = transcript_with_history(2, 3);
        transcript.trim();
        assert!(transcript
            .messages()
            .iter()
            .all(|m| m.content != "first question"));
    }

    #[test]
    fn test_clear_empties_transcript() {
        let mut transcript = transcript_with_history(6, 1);
        transcript.clear();
        assert!(transcript.is_empty());
    }
}
