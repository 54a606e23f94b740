//! CLI command definitions for the `twinchat` binary.
//!
//! Uses clap derive macros for argument parsing. Every configuration value
//! can also be supplied through its environment variable.

pub mod chat;

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use twinchat_types::config::{
    AppConfig, DEFAULT_MEMORY_DIR, DEFAULT_MODEL_ID, DEFAULT_REGION, DEFAULT_REQUEST_TIMEOUT_SECS,
    ModelConfig, StorageConfig,
};

/// Chat with a persona-backed digital twin.
#[derive(Parser)]
#[command(name = "twinchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, env = "PORT", default_value = "8000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: String,
    },

    /// Send one message and print the reply.
    Chat {
        /// Session to continue; a new one is started if omitted.
        #[arg(short, long)]
        session: Option<String>,

        /// The message to send.
        message: String,
    },

    /// Print the stored conversation for a session.
    History {
        /// Session ID to show.
        session_id: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Runtime configuration shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Store conversations in S3 instead of the local directory.
    #[arg(
        long,
        env = "USE_S3",
        global = true,
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub use_s3: bool,

    /// S3 bucket holding conversation objects.
    #[arg(long, env = "S3_BUCKET", global = true)]
    pub s3_bucket: Option<String>,

    /// Custom S3 endpoint (S3-compatible stores, path-style addressing).
    #[arg(long, env = "S3_ENDPOINT", global = true)]
    pub s3_endpoint: Option<String>,

    /// Directory for local conversation files.
    #[arg(long, env = "MEMORY_DIR", global = true, default_value = DEFAULT_MEMORY_DIR)]
    pub memory_dir: PathBuf,

    /// Bedrock model id.
    #[arg(long, env = "BEDROCK_MODEL_ID", global = true, default_value = DEFAULT_MODEL_ID)]
    pub model_id: String,

    /// AWS region for Bedrock and S3.
    #[arg(long, env = "DEFAULT_AWS_REGION", global = true, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Directory holding the persona files.
    #[arg(long, env = "PERSONA_DIR", global = true, default_value = "./data")]
    pub persona_dir: PathBuf,

    /// Allowed CORS origins (comma-separated, `*` for any).
    #[arg(
        long,
        env = "CORS_ORIGINS",
        global = true,
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub cors_origins: Vec<String>,

    /// Timeout for outbound S3 and Bedrock requests, in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(
        long,
        env = "TWINCHAT_OTEL",
        global = true,
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub otel: bool,

    /// Emit logs as JSON lines.
    #[arg(
        long,
        env = "TWINCHAT_LOG_JSON",
        global = true,
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: bool,
}

impl ConfigArgs {
    /// Resolve the flags into an [`AppConfig`].
    ///
    /// # Errors
    ///
    /// Fails when S3 storage is selected without a bucket.
    pub fn to_app_config(&self) -> anyhow::Result<AppConfig> {
        let storage = if self.use_s3 {
            let bucket = self
                .s3_bucket
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .ok_or_else(|| anyhow::anyhow!("USE_S3 is enabled but S3_BUCKET is not set"))?;
            StorageConfig::S3 {
                bucket: bucket.to_string(),
                region: self.region.clone(),
                endpoint: self
                    .s3_endpoint
                    .clone()
                    .filter(|e| !e.trim().is_empty()),
            }
        } else {
            StorageConfig::Local {
                dir: self.memory_dir.clone(),
            }
        };

        let cors_origins = self
            .cors_origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(AppConfig {
            storage,
            model: ModelConfig {
                model_id: self.model_id.clone(),
                region: self.region.clone(),
            },
            persona_dir: self.persona_dir.clone(),
            cors_origins,
            request_timeout_secs: self.request_timeout_secs,
        })
    }
}
