//! Conversation state and request sequencing
//!
//! The engine owns an ordered transcript of role-tagged messages and drives
//! the three request flows against the chat service: initial morning-routine
//! generation, on-demand night-routine generation, and free-form follow-up.

mod engine;
pub mod prompts;
mod transcript;

#[cfg(test)]
mod proptests;

pub use engine::{ConversationEngine, EngineError, EngineState, Exchange, Reply};
pub use transcript::{ChatMessage, Role, Transcript, DEFAULT_WINDOW};
