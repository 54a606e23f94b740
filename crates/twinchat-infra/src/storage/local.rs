//! Filesystem conversation store: one `{session_id}.json` file per session
//! under a configured directory.

use std::path::{Path, PathBuf};

use twinchat_core::storage::store::ConversationStore;
use twinchat_types::chat::{SessionId, Turn};
use twinchat_types::error::StorageError;

use super::{decode_log, encode_log};

/// Conversation store backed by a local directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so a reader never observes a half-written log.
#[derive(Debug, Clone)]
pub struct LocalConversationStore {
    dir: PathBuf,
}

impl LocalConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the log file for a session.
    pub fn session_path(&self, session_id: &SessionId) -> PathBuf {
        self.dir.join(session_id.storage_key())
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io(format!("failed to {action} {}: {err}", path.display()))
}

impl ConversationStore for LocalConversationStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<Vec<Turn>>, StorageError> {
        let path = self.session_path(session_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read", &path, e)),
        };

        decode_log(&session_id.storage_key(), &bytes).map(Some)
    }

    async fn put(&self, session_id: &SessionId, turns: &[Turn]) -> Result<(), StorageError> {
        let key = session_id.storage_key();
        let bytes = encode_log(&key, turns)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error("create directory", &self.dir, e))?;

        let target = self.dir.join(&key);
        let tmp = self
            .dir
            .join(format!(".{key}.{}.tmp", uuid::Uuid::new_v4().simple()));

        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error("write", &tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error("replace", &target, e));
        }

        tracing::debug!(path = %target.display(), turns = turns.len(), "Saved conversation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sid(s: &str) -> SessionId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_missing_session_is_none() {
        let dir = tempdir().unwrap();
        let store = LocalConversationStore::new(dir.path());
        assert!(store.get(&sid("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = LocalConversationStore::new(dir.path());
        let now = Utc::now();
        let turns = vec![
            Turn::user("Hello, こんにちは", now),
            Turn::assistant("Hi there!", now),
        ];

        store.put(&sid("abc"), &turns).await.unwrap();
        let loaded = store.get(&sid("abc")).await.unwrap().unwrap();
        assert_eq!(loaded, turns);
    }

    #[tokio::test]
    async fn test_put_creates_directory_and_writes_pretty_json() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("memory").join("deep");
        let store = LocalConversationStore::new(&nested);
        let turns = vec![Turn::user("Hi", Utc::now())];

        store.put(&sid("abc"), &turns).await.unwrap();

        let text = std::fs::read_to_string(nested.join("abc.json")).unwrap();
        assert!(text.starts_with("[\n  {\n    \"role\": \"user\""));
        assert!(text.contains("\"content\": \"Hi\""));
    }

    #[tokio::test]
    async fn test_put_replaces_whole_log_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = LocalConversationStore::new(dir.path());
        let now = Utc::now();

        store
            .put(&sid("abc"), &[Turn::user("one", now), Turn::assistant("two", now)])
            .await
            .unwrap();
        store.put(&sid("abc"), &[Turn::user("only", now)]).await.unwrap();

        let loaded = store.get(&sid("abc")).await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "only");

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["abc.json".to_string()]);
    }

    #[tokio::test]
    async fn test_reads_legacy_naive_timestamps() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("old.json"),
            r#"[{"role": "user", "content": "hey", "timestamp": "2024-05-01T10:20:30.123456"}]"#,
        )
        .unwrap();

        let store = LocalConversationStore::new(dir.path());
        let loaded = store.get(&sid("old")).await.unwrap().unwrap();
        assert_eq!(loaded[0].timestamp, "2024-05-01T10:20:30.123456");
        assert!(loaded[0].parsed_timestamp().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "not json").unwrap();
        let store = LocalConversationStore::new(dir.path());

        let err = store.get(&sid("bad")).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_unknown_role_is_corrupt() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("sys.json"),
            r#"[{"role": "system", "content": "x", "timestamp": "2024-05-01T10:20:30"}]"#,
        )
        .unwrap();
        let store = LocalConversationStore::new(dir.path());

        let err = store.get(&sid("sys")).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
