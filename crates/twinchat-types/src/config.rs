//! Process configuration for twinchat.
//!
//! `AppConfig` is built once at startup (from CLI flags and environment) and
//! handed to the components that need it. Nothing below the binary reads the
//! environment for these values.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default Bedrock model.
pub const DEFAULT_MODEL_ID: &str = "amazon.nova-lite-v1:0";

/// Default AWS region for Bedrock and S3.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default directory for local conversation files.
pub const DEFAULT_MEMORY_DIR: &str = "../memory";

/// Default outbound request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Where conversation logs are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// One JSON file per session under `dir`.
    Local { dir: PathBuf },
    /// One JSON object per session in `bucket`.
    S3 {
        bucket: String,
        region: String,
        /// Override for S3-compatible stores (path-style addressing).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },
}

impl StorageConfig {
    /// Short label for banners and health output.
    pub fn label(&self) -> &'static str {
        match self {
            StorageConfig::Local { .. } => "local",
            StorageConfig::S3 { .. } => "s3",
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StorageConfig::S3 { .. })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Local {
            dir: PathBuf::from(DEFAULT_MEMORY_DIR),
        }
    }
}

/// Which model to call and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_id: String,
    pub region: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub model: ModelConfig,
    /// Directory holding summary.txt, style.txt, facts.json, linkedin.pdf.
    pub persona_dir: PathBuf,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Timeout applied to every outbound S3/Bedrock request.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            model: ModelConfig::default(),
            persona_dir: PathBuf::from("./data"),
            cors_origins: vec!["http://localhost:3000".to_string()],
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.model.model_id, "amazon.nova-lite-v1:0");
        assert_eq!(config.model.region, "us-east-1");
        assert_eq!(config.storage.label(), "local");
        assert!(!config.storage.is_remote());
    }

    #[test]
    fn test_storage_config_serde_tag() {
        let storage = StorageConfig::S3 {
            bucket: "twin-memory".to_string(),
            region: "eu-west-1".to_string(),
            endpoint: None,
        };
        let json = serde_json::to_value(&storage).unwrap();
        assert_eq!(json["kind"], "s3");
        assert!(json.get("endpoint").is_none());
        assert_eq!(storage.label(), "s3");
    }
}
