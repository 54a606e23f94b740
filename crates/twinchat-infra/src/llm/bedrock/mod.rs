//! AWS Bedrock LLM provider implementation.
//!
//! Implements [`LlmProvider`](twinchat_core::llm::provider::LlmProvider) over
//! the Bedrock Runtime Converse API.

mod client;
pub mod types;

pub use client::{BedrockAuth, BedrockConverseProvider};
