//! Request-path error taxonomy

use thiserror::Error;

/// Failure reaching or interpreting the chat service.
///
/// Failures are surfaced at the orchestration boundary; the transcript is
/// never mutated on the strength of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    /// Non-success HTTP status from the service
    #[error("chat service returned status {0}")]
    Upstream(u16),

    /// Network-level failure: unreachable, timed out, or unreadable body
    #[error("could not reach chat service: {0}")]
    Transport(String),

    /// Well-formed success body without the expected reply field
    #[error("chat service response was missing a reply")]
    MalformedResponse,
}
