//! Conversation repository.
//!
//! Loads and saves a session's log through a [`ConversationStore`] and owns
//! the append semantics: new turns go after the existing ones, in order,
//! with no deduplication or role-alternation checks.

use tracing::debug;

use twinchat_types::chat::{SessionId, Turn};
use twinchat_types::error::StorageError;

use crate::storage::store::ConversationStore;

/// Append-only access to per-session conversation logs.
pub struct ConversationRepository<S: ConversationStore> {
    store: S,
}

impl<S: ConversationStore> ConversationRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load a session's log. A session that was never written is empty.
    pub async fn load(&self, session_id: &SessionId) -> Result<Vec<Turn>, StorageError> {
        let turns = self.store.get(session_id).await?.unwrap_or_default();
        debug!(session_id = %session_id, turns = turns.len(), backend = self.store.name(), "Conversation loaded");
        Ok(turns)
    }

    /// Stored log for a raw, client-supplied session id.
    ///
    /// An id that could never have been stored (empty or over-long) reads as
    /// an unknown session.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Turn>, StorageError> {
        match session_id.parse::<SessionId>() {
            Ok(id) => self.load(&id).await,
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Append `new_turns` after `existing` and persist the whole log.
    pub async fn append_and_save(
        &self,
        session_id: &SessionId,
        mut existing: Vec<Turn>,
        new_turns: Vec<Turn>,
    ) -> Result<(), StorageError> {
        existing.extend(new_turns);
        self.store.put(session_id, &existing).await?;
        debug!(session_id = %session_id, turns = existing.len(), backend = self.store.name(), "Conversation saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use twinchat_types::chat::MAX_SESSION_ID_LEN;

    #[derive(Default)]
    struct MemoryStore {
        logs: Mutex<HashMap<SessionId, Vec<Turn>>>,
    }

    impl ConversationStore for MemoryStore {
        fn name(&self) -> &str {
            "memory"
        }

        async fn get(&self, session_id: &SessionId) -> Result<Option<Vec<Turn>>, StorageError> {
            Ok(self.logs.lock().unwrap().get(session_id).cloned())
        }

        async fn put(&self, session_id: &SessionId, turns: &[Turn]) -> Result<(), StorageError> {
            self.logs
                .lock()
                .unwrap()
                .insert(session_id.clone(), turns.to_vec());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_append_keeps_existing_turns_first() {
        let repo = ConversationRepository::new(MemoryStore::default());
        let id: SessionId = "user.42".parse().unwrap();
        let now = Utc::now();

        repo.append_and_save(&id, Vec::new(), vec![Turn::user("a", now)])
            .await
            .unwrap();
        let existing = repo.load(&id).await.unwrap();
        repo.append_and_save(&id, existing, vec![Turn::user("b", now), Turn::assistant("c", now)])
            .await
            .unwrap();

        let contents: Vec<_> = repo
            .history("user.42")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.content)
            .collect();
        assert_eq!(contents, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_history_for_ids_never_stored_is_empty() {
        let repo = ConversationRepository::new(MemoryStore::default());
        assert!(repo.history("user.42").await.unwrap().is_empty());
        assert!(repo.history("").await.unwrap().is_empty());
        let long = "x".repeat(MAX_SESSION_ID_LEN + 1);
        assert!(repo.history(&long).await.unwrap().is_empty());
    }
}
