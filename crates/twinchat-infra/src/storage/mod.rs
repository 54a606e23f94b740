//! Conversation store implementations.
//!
//! Both backends persist a session as one pretty-printed JSON array of
//! `{role, content, timestamp}` objects under the key `{session_id}.json`.
//! The backend is chosen once from [`StorageConfig`] and boxed.

pub mod local;
pub mod s3;

use twinchat_core::storage::box_store::BoxConversationStore;
use twinchat_types::chat::Turn;
use twinchat_types::config::StorageConfig;
use twinchat_types::error::StorageError;

use crate::aws::AwsCredentials;

pub use local::LocalConversationStore;
pub use s3::S3ConversationStore;

/// Serialize a log to its stored form.
pub fn encode_log(key: &str, turns: &[Turn]) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec_pretty(turns).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Parse a stored log.
pub fn decode_log(key: &str, bytes: &[u8]) -> Result<Vec<Turn>, StorageError> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Build the configured conversation store.
///
/// The S3 backend needs `credentials`; the local backend ignores them.
pub fn build_conversation_store(
    config: &StorageConfig,
    http: reqwest::Client,
    credentials: Option<AwsCredentials>,
) -> Result<BoxConversationStore, StorageError> {
    match config {
        StorageConfig::Local { dir } => {
            tracing::info!(dir = %dir.display(), "Using local conversation store");
            Ok(BoxConversationStore::new(LocalConversationStore::new(dir.clone())))
        }
        StorageConfig::S3 {
            bucket,
            region,
            endpoint,
        } => {
            let credentials = credentials.ok_or_else(|| {
                StorageError::Credentials(
                    "S3 storage requires AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY".to_string(),
                )
            })?;
            tracing::info!(bucket = %bucket, region = %region, endpoint = ?endpoint, "Using S3 conversation store");
            Ok(BoxConversationStore::new(S3ConversationStore::new(
                http,
                bucket.clone(),
                region.clone(),
                endpoint.clone(),
                credentials,
            )))
        }
    }
}
