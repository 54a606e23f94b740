//! Application state wiring the chat pipeline together.
//!
//! AppState holds the concrete service instance used by both CLI and REST API.
//! `ChatService` is generic over store/provider traits; AppState pins it to
//! the boxed infra implementations chosen from [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use twinchat_core::chat::context::ContextAssembler;
use twinchat_core::chat::repository::ConversationRepository;
use twinchat_core::chat::service::ChatService;
use twinchat_core::llm::box_provider::BoxLlmProvider;
use twinchat_core::llm::invoker::ModelInvoker;
use twinchat_core::storage::box_store::BoxConversationStore;
use twinchat_infra::aws::{AwsCredentials, bedrock_bearer_token_from_env, build_http_client};
use twinchat_infra::llm::create_provider;
use twinchat_infra::persona::load_persona;
use twinchat_infra::storage::build_conversation_store;
use twinchat_types::config::AppConfig;
use twinchat_types::persona::Persona;

/// Shared HTTP client with the configured request timeout.
pub fn http_client(config: &AppConfig) -> anyhow::Result<reqwest::Client> {
    build_http_client(Duration::from_secs(config.request_timeout_secs))
        .context("building HTTP client")
}

/// Open the configured conversation store.
///
/// Needs AWS credentials only for the S3 backend; read-only commands use
/// this directly and never touch the model provider.
pub fn open_store(config: &AppConfig, http: reqwest::Client) -> anyhow::Result<BoxConversationStore> {
    build_conversation_store(&config.storage, http, AwsCredentials::from_env())
        .context("configuring conversation storage")
}

/// Chat service pinned to the runtime-selected backends.
pub type ConcreteChatService = ChatService<BoxConversationStore, BoxLlmProvider>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Initialize the application state: load the persona, pick the storage
    /// backend, and build the Bedrock provider.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let persona = load_persona(&config.persona_dir)
            .await
            .with_context(|| format!("loading persona from {}", config.persona_dir.display()))?;

        let http = http_client(&config)?;
        let store = open_store(&config, http.clone())?;

        let provider = create_provider(
            &config.model,
            http,
            bedrock_bearer_token_from_env(),
            AwsCredentials::from_env(),
        )
        .context("configuring Bedrock provider")?;

        Ok(Self::from_parts(config, persona, store, provider))
    }

    /// Wire a state from already-built parts.
    pub fn from_parts(
        config: AppConfig,
        persona: Persona,
        store: BoxConversationStore,
        provider: BoxLlmProvider,
    ) -> Self {
        let chat_service = ChatService::new(
            ConversationRepository::new(store),
            ContextAssembler::new(Arc::new(persona)),
            ModelInvoker::new(provider, config.model.model_id.clone()),
        );

        Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
        }
    }
}
