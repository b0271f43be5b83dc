//! Chat proxy client
//!
//! Speaks the minimal `chat/completions`-shaped contract of the routine
//! proxy: `{messages, max_tokens}` in, `{choices: [{message, finish_reason}]}`
//! out. Only the first choice is consulted; `finish_reason == "length"`
//! marks a reply cut short by the length cap.

use super::{ChatService, Completion, LlmError};
use crate::conversation::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const FINISH_REASON_LENGTH: &str = "length";

/// Connection settings for the proxy
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Endpoint URL, POSTed to directly
    pub endpoint: String,
    /// Optional bearer token; the hosted proxy holds its own key and needs
    /// none
    pub api_key: Option<String>,
}

/// HTTP client for the chat proxy
pub struct ProxyClient {
    client: Client,
    config: ProxyConfig,
}

impl ProxyClient {
    pub fn new(config: ProxyConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }
}

#[async_trait]
impl ChatService for ProxyClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<Completion, LlmError> {
        let mut request = self.client.post(&self.config.endpoint).json(&WireRequest {
            messages,
            max_tokens,
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Upstream(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        let parsed: WireResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::Transport(format!("unparsable response body: {e}")))?;

        extract_completion(parsed)
    }
}

/// Pull the first choice out of a parsed body; a success body without a
/// reply is malformed, not a crash.
fn extract_completion(response: WireResponse) -> Result<Completion, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::MalformedResponse)?;

    let content = choice
        .message
        .and_then(|m| m.content)
        .ok_or(LlmError::MalformedResponse)?;

    let truncated = choice.finish_reason.as_deref() == Some(FINISH_REASON_LENGTH);

    Ok(Completion { content, truncated })
}

// Wire types

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    #[serde(default)]
    message: Option<WireMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let messages = vec![
            ChatMessage::system("persona"),
            ChatMessage::user("question"),
        ];
        let value = serde_json::to_value(WireRequest {
            messages: &messages,
            max_tokens: 3000,
        })
        .unwrap();

        assert_eq!(
            value,
            json!({
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "question"}
                ],
                "max_tokens": 3000
            })
        );
    }

    #[test]
    fn test_extracts_first_choice_only() {
        let parsed: WireResponse = serde_json::from_str(
            r#"{"choices": [
                {"message": {"content": "Step 1..."}, "finish_reason": "stop"},
                {"message": {"content": "ignored"}, "finish_reason": "stop"}
            ]}"#,
        )
        .unwrap();

        let completion = extract_completion(parsed).unwrap();
        assert_eq!(completion.content, "Step 1...");
        assert!(!completion.truncated);
    }

    #[test]
    fn test_length_finish_reason_marks_truncation() {
        let parsed: WireResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "partial"}, "finish_reason": "length"}]}"#,
        )
        .unwrap();

        assert!(extract_completion(parsed).unwrap().truncated);
    }

    #[test]
    fn test_missing_reply_field_is_malformed() {
        let no_choices: WireResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(
            extract_completion(no_choices),
            Err(LlmError::MalformedResponse)
        );

        let no_content: WireResponse =
            serde_json::from_str(r#"{"choices": [{"finish_reason": "stop"}]}"#).unwrap();
        assert_eq!(
            extract_completion(no_content),
            Err(LlmError::MalformedResponse)
        );
    }

    #[test]
    fn test_absent_finish_reason_is_not_truncation() {
        let parsed: WireResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "done"}}]}"#).unwrap();
        assert!(!extract_completion(parsed).unwrap().truncated);
    }
}
