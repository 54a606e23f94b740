//! ConversationStore trait definition.
//!
//! Key-value persistence for conversation logs, keyed by session id.
//! Follows the same RPITIT pattern as the provider trait.

use twinchat_types::chat::{SessionId, Turn};
use twinchat_types::error::StorageError;

/// Durable store for per-session conversation logs.
///
/// Writes replace the whole log; readers never observe a partial write.
/// There is no locking here: two writers for the same session race and the
/// later `put` wins. Serialization per session happens in the chat pipeline.
///
/// Implementations live in twinchat-infra (`LocalConversationStore`,
/// `S3ConversationStore`).
pub trait ConversationStore: Send + Sync {
    /// Short backend name for logs (e.g., "local", "s3").
    fn name(&self) -> &str;

    /// Fetch the log for a session. Returns `None` if nothing was ever stored.
    fn get(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Option<Vec<Turn>>, StorageError>> + Send;

    /// Replace the stored log for a session.
    fn put(
        &self,
        session_id: &SessionId,
        turns: &[Turn],
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
