//! BoxConversationStore -- object-safe dynamic dispatch wrapper for ConversationStore.
//!
//! Same blanket-impl pattern as `BoxLlmProvider`:
//! 1. Define an object-safe `ConversationStoreDyn` trait with boxed futures
//! 2. Blanket-impl `ConversationStoreDyn` for all `T: ConversationStore`
//! 3. `BoxConversationStore` wraps `Box<dyn ConversationStoreDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use twinchat_types::chat::{SessionId, Turn};
use twinchat_types::error::StorageError;

use super::store::ConversationStore;

/// Object-safe version of [`ConversationStore`] with boxed futures.
pub trait ConversationStoreDyn: Send + Sync {
    fn name(&self) -> &str;

    fn get_boxed<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<Turn>>, StorageError>> + Send + 'a>>;

    fn put_boxed<'a>(
        &'a self,
        session_id: &'a SessionId,
        turns: &'a [Turn],
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + 'a>>;
}

impl<T: ConversationStore> ConversationStoreDyn for T {
    fn name(&self) -> &str {
        ConversationStore::name(self)
    }

    fn get_boxed<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<Turn>>, StorageError>> + Send + 'a>> {
        Box::pin(self.get(session_id))
    }

    fn put_boxed<'a>(
        &'a self,
        session_id: &'a SessionId,
        turns: &'a [Turn],
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + 'a>> {
        Box::pin(self.put(session_id, turns))
    }
}

/// Type-erased conversation store, chosen once at startup.
///
/// The backend (local or S3) is fixed when this is constructed; callers never
/// branch on it per request.
pub struct BoxConversationStore {
    inner: Box<dyn ConversationStoreDyn + Send + Sync>,
}

impl BoxConversationStore {
    /// Wrap a concrete `ConversationStore` in a type-erased box.
    pub fn new<T: ConversationStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }
}

impl ConversationStore for BoxConversationStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<Vec<Turn>>, StorageError> {
        self.inner.get_boxed(session_id).await
    }

    async fn put(&self, session_id: &SessionId, turns: &[Turn]) -> Result<(), StorageError> {
        self.inner.put_boxed(session_id, turns).await
    }
}
