//! Model provider abstractions and the model invoker.
//!
//! Providers implement [`provider::LlmProvider`]; [`invoker::ModelInvoker`]
//! attaches the fixed inference parameters and normalizes failures.

pub mod box_provider;
pub mod invoker;
pub mod provider;
