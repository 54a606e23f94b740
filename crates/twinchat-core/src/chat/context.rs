//! Context assembly for a model request.
//!
//! Turns a stored conversation log plus a new user utterance into the
//! bounded, ordered message list sent to the model, alongside the system
//! instruction derived from the persona.

use std::sync::Arc;

use twinchat_types::chat::Turn;
use twinchat_types::llm::{Message, MessageRole};
use twinchat_types::persona::Persona;

use super::prompt::SystemPromptBuilder;

/// Maximum number of prior turns sent to the model.
pub const HISTORY_WINDOW: usize = 20;

/// Everything the model sees for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    /// System instruction, sent outside the message list.
    pub system: String,
    /// Windowed history (oldest first) followed by the new user message.
    pub messages: Vec<Message>,
}

impl AssembledContext {
    /// Number of request entries: the system instruction plus every message.
    pub fn entry_count(&self) -> usize {
        1 + self.messages.len()
    }
}

/// Builds [`AssembledContext`]s from a shared, immutable persona.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    persona: Arc<Persona>,
}

impl ContextAssembler {
    pub fn new(persona: Arc<Persona>) -> Self {
        Self { persona }
    }

    /// Assemble the request for `user_message` on top of `history`.
    ///
    /// Only the last [`HISTORY_WINDOW`] turns of `history` are included;
    /// `history` itself is borrowed and left untouched.
    pub fn build(&self, history: &[Turn], user_message: &str) -> AssembledContext {
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        let mut messages: Vec<Message> = history[start..]
            .iter()
            .map(|turn| Message {
                role: turn.role,
                content: turn.content.clone(),
            })
            .collect();

        messages.push(Message {
            role: MessageRole::User,
            content: user_message.to_string(),
        });

        AssembledContext {
            system: SystemPromptBuilder::build(&self.persona),
            messages,
        }
    }
}
