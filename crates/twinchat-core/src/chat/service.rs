//! Chat service orchestrating one conversation turn.
//!
//! ChatService coordinates the ConversationRepository, ContextAssembler, and
//! ModelInvoker: resolve the session id, load the log, assemble the request,
//! call the model, then append the user and assistant turns and save.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use twinchat_types::chat::{SessionId, Turn, TurnOutcome};
use twinchat_types::error::ChatError;

use crate::llm::invoker::ModelInvoker;
use crate::llm::provider::LlmProvider;
use crate::storage::store::ConversationStore;

use super::context::ContextAssembler;
use super::repository::ConversationRepository;
use super::session_lock::SessionLocks;

/// Runs chat turns against a store and a model provider.
///
/// Generic over `ConversationStore` and `LlmProvider` to maintain clean
/// architecture (twinchat-core never depends on twinchat-infra).
pub struct ChatService<S: ConversationStore, P: LlmProvider> {
    repository: ConversationRepository<S>,
    assembler: ContextAssembler,
    invoker: ModelInvoker<P>,
    locks: SessionLocks,
}

impl<S: ConversationStore, P: LlmProvider> ChatService<S, P> {
    pub fn new(
        repository: ConversationRepository<S>,
        assembler: ContextAssembler,
        invoker: ModelInvoker<P>,
    ) -> Self {
        Self {
            repository,
            assembler,
            invoker,
            locks: SessionLocks::new(),
        }
    }

    /// Access the conversation repository.
    pub fn repository(&self) -> &ConversationRepository<S> {
        &self.repository
    }

    /// Access the model invoker.
    pub fn invoker(&self) -> &ModelInvoker<P> {
        &self.invoker
    }

    /// Handle one chat turn.
    ///
    /// A missing or empty `session_id` starts a new session with a generated
    /// id. If the model call fails nothing is written, so the stored log is
    /// exactly what it was before the call. If the final save fails the reply
    /// has been computed but is not returned: the caller sees
    /// [`ChatError::Persist`].
    pub async fn handle_turn(
        &self,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<TurnOutcome, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let session_id = match session_id.filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<SessionId>()?,
            None => {
                let generated = SessionId::generate();
                info!(session_id = %generated, "Starting new session");
                generated
            }
        };

        let _guard = self.locks.acquire(&session_id).await;

        let history = self
            .repository
            .load(&session_id)
            .await
            .map_err(ChatError::Storage)?;

        let context = self.assembler.build(&history, message);
        let reply = self.invoker.complete(&context).await?;

        let user_at = next_timestamp(history.last(), Utc::now());
        let user_turn = Turn::user(message, user_at);
        let assistant_at = next_timestamp(Some(&user_turn), Utc::now());
        let assistant_turn = Turn::assistant(reply.clone(), assistant_at);

        let prior_turns = history.len();
        if let Err(err) = self
            .repository
            .append_and_save(&session_id, history, vec![user_turn, assistant_turn])
            .await
        {
            warn!(
                session_id = %session_id,
                error = %err,
                "Reply computed but conversation not saved"
            );
            return Err(ChatError::Persist(err));
        }

        info!(session_id = %session_id, prior_turns, reply_chars = reply.chars().count(), "Turn completed");

        Ok(TurnOutcome { reply, session_id })
    }

    /// Full stored log for a session; empty for a session never written.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Turn>, ChatError> {
        self.repository
            .history(session_id)
            .await
            .map_err(ChatError::Storage)
    }
}

/// Stamp for a new turn: `now`, but never earlier than the previous turn.
///
/// Offset-less legacy stamps are local time of an unknown zone, so they do
/// not hold the clock back.
fn next_timestamp(previous: Option<&Turn>, now: DateTime<Utc>) -> DateTime<Utc> {
    previous
        .and_then(Turn::zoned_timestamp)
        .map_or(now, |prev| prev.max(now))
}
