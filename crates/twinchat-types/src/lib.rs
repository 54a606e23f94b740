//! Shared domain types for twinchat.
//!
//! This crate contains the types that flow through the chat pipeline:
//! sessions and turns, LLM request/response shapes, the persona blob, the
//! process configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod persona;
