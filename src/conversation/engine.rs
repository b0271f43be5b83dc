//! The conversation engine and its request flows

use super::prompts;
use super::transcript::{ChatMessage, Transcript};
use crate::catalog::ProductSummary;
use crate::llm::{ChatService, LlmError};
use std::sync::Arc;
use thiserror::Error;

/// Reply-length budget for the initial morning routine
const MORNING_REPLY_BUDGET: u32 = 3000;
/// Reply-length budget for the night routine
const NIGHT_REPLY_BUDGET: u32 = 2500;
/// Reply-length budget for follow-up questions
const FOLLOW_UP_REPLY_BUDGET: u32 = 2000;

/// Failures of the request flows
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A routine was requested with nothing selected
    #[error("select at least one product before generating a routine")]
    EmptySelection,

    /// A follow-up or night routine arrived before any routine was generated
    #[error("generate a routine first, then ask follow-up questions")]
    NoActiveConversation,

    /// The request was issued and failed at the orchestration boundary
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No conversation started
    #[default]
    Idle,
    /// Transcript live, no request in flight
    Active,
    /// Request in flight
    Pending,
}

/// A settled reply from the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// The reply was cut short by the length cap; the front end should
    /// invite the user to send `continue`
    pub truncated: bool,
}

/// Outcome of one user-initiated flow: the text to echo for the user's turn
/// plus the assistant's reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user_display: String,
    pub reply: Reply,
}

/// Drives one logical conversation against the chat service.
///
/// Flow methods take `&mut self` and suspend at the network call, so a
/// second request cannot be issued while one is pending. There is no
/// cancellation: each call settles (reply or error) before the next user
/// action is accepted.
pub struct ConversationEngine {
    service: Arc<dyn ChatService>,
    transcript: Transcript,
    state: EngineState,
}

impl ConversationEngine {
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        Self {
            service,
            transcript: Transcript::default(),
            state: EngineState::Idle,
        }
    }

    /// Engine with a non-default trimming window
    pub fn with_window(service: Arc<dyn ChatService>, window: usize) -> Self {
        Self {
            service,
            transcript: Transcript::new(window),
            state: EngineState::Idle,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        self.transcript.messages()
    }

    /// Seed a fresh conversation and request the morning routine.
    ///
    /// Any prior conversation is discarded. On failure the transcript keeps
    /// the seeded system + user pair, so a retry re-issues from the same
    /// two-message starting point.
    pub async fn start_routine(
        &mut self,
        selection: &[ProductSummary],
    ) -> Result<Exchange, EngineError> {
        if selection.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let request = prompts::morning_routine_request(selection);
        self.transcript.seed(prompts::SYSTEM_PROMPT, request.clone());
        self.state = EngineState::Active;

        let reply = self.exchange(MORNING_REPLY_BUDGET).await?;
        Ok(Exchange {
            user_display: request,
            reply,
        })
    }

    /// Ask for the night routine for the products already discussed.
    ///
    /// The caller gets the short display form back while the longer fixed
    /// request goes upstream. The request message stays in the transcript
    /// even when the call fails, so a retry carries one extra turn of
    /// context. Known tradeoff, kept as-is pending product review.
    pub async fn request_night_routine(&mut self) -> Result<Exchange, EngineError> {
        if self.transcript.is_empty() {
            return Err(EngineError::NoActiveConversation);
        }

        self.transcript.push_user(prompts::NIGHT_ROUTINE_REQUEST);
        let reply = self.exchange(NIGHT_REPLY_BUDGET).await?;
        Ok(Exchange {
            user_display: prompts::NIGHT_ROUTINE_DISPLAY.to_string(),
            reply,
        })
    }

    /// Send a free-form follow-up question.
    ///
    /// A literal `continue` (case-insensitive, surrounding whitespace
    /// ignored) is rewritten for the service while the caller gets the
    /// short display form back. History is trimmed to the window before
    /// sending.
    pub async fn ask_follow_up(&mut self, text: &str) -> Result<Exchange, EngineError> {
        if self.transcript.is_empty() {
            return Err(EngineError::NoActiveConversation);
        }

        let question = text.trim();
        let (display, upstream) = if question.eq_ignore_ascii_case("continue") {
            (prompts::CONTINUE_DISPLAY, prompts::CONTINUE_UPSTREAM)
        } else {
            (question, question)
        };

        self.transcript.push_user(upstream);
        self.transcript.trim();

        let reply = self.exchange(FOLLOW_UP_REPLY_BUDGET).await?;
        Ok(Exchange {
            user_display: display.to_string(),
            reply,
        })
    }

    /// Discard the conversation, from any state
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.state = EngineState::Idle;
    }

    /// One request/response cycle: serialize the transcript, wait for
    /// settle, and append the assistant reply only on confirmed success.
    /// The retained-history cap is re-enforced after the reply lands.
    async fn exchange(&mut self, max_tokens: u32) -> Result<Reply, EngineError> {
        self.state = EngineState::Pending;
        let result = self
            .service
            .complete(self.transcript.messages(), max_tokens)
            .await;
        self.state = EngineState::Active;

        let completion = result?;
        self.transcript.push_assistant(completion.content.clone());
        self.transcript.trim();

        Ok(Reply {
            content: completion.content,
            truncated: completion.truncated,
        })
    }
}
