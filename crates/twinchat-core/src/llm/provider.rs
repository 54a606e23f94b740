//! LlmProvider trait definition.
//!
//! This is the core abstraction that model backends implement.
//! Uses RPITIT for `complete`; `BoxLlmProvider` supplies dynamic dispatch.

use twinchat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for model provider backends (Bedrock Converse, test doubles).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in twinchat-infra (e.g., `BedrockConverseProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "bedrock").
    fn name(&self) -> &str;

    /// Send a completion request and receive the extracted reply.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
