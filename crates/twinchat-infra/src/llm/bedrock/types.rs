//! AWS Bedrock Converse API request/response types.
//!
//! Converse is model-agnostic: the model id goes in the URL path and the body
//! carries the system prompt, the message list and the inference settings in
//! camelCase. Every message body is a list of content blocks; only text blocks
//! are sent or read here.

use serde::{Deserialize, Serialize};

use twinchat_types::llm::{CompletionRequest, Message};

/// A single content block. Non-text blocks in a response deserialize with
/// `text: None` and are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl From<&Message> for ConverseMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.to_string(),
            content: vec![ContentBlock::text(message.content.clone())],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

/// Request body for `POST /model/{modelId}/converse`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    pub messages: Vec<ConverseMessage>,
    pub system: Vec<ContentBlock>,
    pub inference_config: InferenceConfig,
}

impl From<&CompletionRequest> for ConverseRequest {
    fn from(request: &CompletionRequest) -> Self {
        Self {
            messages: request.messages.iter().map(ConverseMessage::from).collect(),
            system: vec![ContentBlock::text(request.system.clone())],
            inference_config: InferenceConfig {
                max_tokens: request.params.max_tokens,
                temperature: request.params.temperature,
                top_p: request.params.top_p,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverseOutput {
    pub message: Option<ConverseMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Response body of a successful Converse call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseResponse {
    pub output: ConverseOutput,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: ConverseUsage,
}

impl ConverseResponse {
    /// First text segment of the output message, unmodified.
    pub fn first_text(&self) -> Option<&str> {
        self.output
            .message
            .as_ref()?
            .content
            .iter()
            .find_map(|block| block.text.as_deref())
    }
}

/// Error body returned by Bedrock on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BedrockErrorBody {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinchat_types::llm::{InferenceParams, MessageRole};

    #[test]
    fn test_converse_request_wire_shape() {
        let request = CompletionRequest {
            model: "amazon.nova-lite-v1:0".to_string(),
            system: "You are Ada.".to_string(),
            messages: vec![
                Message {
                    role: MessageRole::User,
                    content: "Hi".to_string(),
                },
                Message {
                    role: MessageRole::Assistant,
                    content: "Hello!".to_string(),
                },
            ],
            params: InferenceParams {
                max_tokens: 2000,
                temperature: 0.7,
                top_p: 0.9,
            },
        };

        let json = serde_json::to_value(ConverseRequest::from(&request)).unwrap();
        assert_eq!(json["system"][0]["text"], "You are Ada.");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["text"], "Hi");
        assert_eq!(json["messages"][1]["role"], "assistant");
        assert_eq!(json["inferenceConfig"]["maxTokens"], 2000);
        assert_eq!(json["inferenceConfig"]["temperature"], 0.7);
        assert_eq!(json["inferenceConfig"]["topP"], 0.9);
        // model goes in the URL
        assert!(json.get("model").is_none());
    }

    #[test]
    fn test_converse_response_first_text() {
        let body = r#"{
            "output": {"message": {"role": "assistant", "content": [
                {"reasoningContent": {"reasoningText": {"text": "hmm"}}},
                {"text": "I build data platforms."},
                {"text": "second"}
            ]}},
            "stopReason": "end_turn",
            "usage": {"inputTokens": 120, "outputTokens": 8, "totalTokens": 128},
            "metrics": {"latencyMs": 412}
        }"#;
        let resp: ConverseResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.first_text(), Some("I build data platforms."));
        assert_eq!(resp.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(resp.usage.input_tokens, 120);
        assert_eq!(resp.usage.output_tokens, 8);
    }

    #[test]
    fn test_converse_response_empty_text_passes_through() {
        let body = r#"{"output": {"message": {"role": "assistant", "content": [{"text": ""}]}}}"#;
        let resp: ConverseResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.first_text(), Some(""));
    }

    #[test]
    fn test_converse_response_without_text() {
        let body = r#"{"output": {"message": {"role": "assistant", "content": []}}}"#;
        let resp: ConverseResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.first_text(), None);
    }
}
