//! Conversation storage abstractions.
//!
//! Defines the `ConversationStore` trait and its type-erased wrapper.
//! Implementations (local filesystem, S3) live in twinchat-infra.

pub mod box_store;
pub mod store;
