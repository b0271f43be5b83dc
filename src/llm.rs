//! Chat service abstraction
//!
//! One seam between the conversation engine and the remote inference
//! endpoint, so tests can swap in a scripted mock and the real client can
//! be wrapped with logging.

mod error;
mod proxy;

pub use error::LlmError;
pub use proxy::{ProxyClient, ProxyConfig};

use crate::conversation::ChatMessage;
use async_trait::async_trait;
use std::sync::Arc;

/// A settled reply from the chat service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    /// True when the reply was cut short by the length cap
    pub truncated: bool,
}

/// Common interface to the inference service
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send the serialized transcript and wait for the reply.
    ///
    /// `max_tokens` caps the reply length; each request flow supplies its
    /// own budget.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<Completion, LlmError>;
}

/// Logging wrapper for chat services
pub struct LoggingService {
    inner: Arc<dyn ChatService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn ChatService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatService for LoggingService {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<Completion, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(messages, max_tokens).await;
        let duration = start.elapsed();

        match &result {
            Ok(completion) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    messages = messages.len(),
                    max_tokens,
                    truncated = completion.truncated,
                    "chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    messages = messages.len(),
                    max_tokens,
                    error = %e,
                    "chat request failed"
                );
            }
        }

        result
    }
}
