//! Model invoker for twinchat.
//!
//! ModelInvoker turns an [`AssembledContext`] into a `CompletionRequest`
//! with the fixed inference parameters, sends it through the provider, and
//! collapses every provider failure into one [`ModelInvocationError`].
//! GenAI-style span fields instrument every call.

use tracing::{Instrument, debug, info_span, warn};

use twinchat_types::error::ModelInvocationError;
use twinchat_types::llm::{CompletionRequest, InferenceParams};

use crate::chat::context::AssembledContext;

use super::provider::LlmProvider;

/// Maximum output tokens per reply.
pub const MAX_OUTPUT_TOKENS: u32 = 2000;

/// Sampling temperature.
pub const TEMPERATURE: f64 = 0.7;

/// Nucleus-sampling threshold.
pub const TOP_P: f64 = 0.9;

/// Inference parameters sent with every request.
pub const INFERENCE_PARAMS: InferenceParams = InferenceParams {
    max_tokens: MAX_OUTPUT_TOKENS,
    temperature: TEMPERATURE,
    top_p: TOP_P,
};

/// Executes model calls for the chat pipeline. No retries: a failed call
/// fails the turn.
pub struct ModelInvoker<P: LlmProvider> {
    provider: P,
    model_id: String,
}

impl<P: LlmProvider> ModelInvoker<P> {
    pub fn new(provider: P, model_id: String) -> Self {
        Self { provider, model_id }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Build the provider request for an assembled context.
    pub fn build_request(&self, context: &AssembledContext) -> CompletionRequest {
        CompletionRequest {
            model: self.model_id.clone(),
            system: context.system.clone(),
            messages: context.messages.clone(),
            params: INFERENCE_PARAMS,
        }
    }

    /// Send the context to the model and return the reply text.
    pub async fn complete(&self, context: &AssembledContext) -> Result<String, ModelInvocationError> {
        let request = self.build_request(context);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.params.max_tokens,
            gen_ai.request.temperature = request.params.temperature,
            gen_ai.request.top_p = request.params.top_p,
            gen_ai.request.messages = request.messages.len(),
        );

        match self.provider.complete(&request).instrument(span).await {
            Ok(response) => {
                debug!(
                    model = %self.model_id,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    stop_reason = ?response.stop_reason,
                    "Model call completed"
                );
                Ok(response.content)
            }
            Err(err) => {
                warn!(model = %self.model_id, error = %err, "Model call failed");
                Err(ModelInvocationError {
                    message: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use twinchat_types::llm::{CompletionResponse, LlmError, Message, MessageRole, Usage};

    #[derive(Default)]
    struct RecordingProvider {
        seen: Mutex<Vec<CompletionRequest>>,
        fail_with: Option<String>,
    }

    impl LlmProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.fail_with {
                Some(msg) => Err(LlmError::AuthenticationFailed(msg.clone())),
                None => Ok(CompletionResponse {
                    content: String::new(),
                    stop_reason: Some("end_turn".to_string()),
                    usage: Usage::default(),
                }),
            }
        }
    }

    fn context() -> AssembledContext {
        AssembledContext {
            system: "be yourself".to_string(),
            messages: vec![Message {
                role: MessageRole::User,
                content: "Hi".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_request_carries_fixed_params() {
        let invoker = ModelInvoker::new(RecordingProvider::default(), "amazon.nova-lite-v1:0".to_string());
        invoker.complete(&context()).await.unwrap();

        let seen = invoker.provider().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "amazon.nova-lite-v1:0");
        assert_eq!(seen[0].system, "be yourself");
        assert_eq!(seen[0].params.max_tokens, 2000);
        assert_eq!(seen[0].params.temperature, 0.7);
        assert_eq!(seen[0].params.top_p, 0.9);
    }

    #[tokio::test]
    async fn test_empty_reply_passes_through() {
        let invoker = ModelInvoker::new(RecordingProvider::default(), "m".to_string());
        assert_eq!(invoker.complete(&context()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_provider_error_is_normalized() {
        let provider = RecordingProvider {
            fail_with: Some("expired token".to_string()),
            ..Default::default()
        };
        let invoker = ModelInvoker::new(provider, "m".to_string());
        let err = invoker.complete(&context()).await.unwrap_err();
        assert!(err.message.contains("expired token"));
        assert_eq!(invoker.provider().seen.lock().unwrap().len(), 1);
    }
}
