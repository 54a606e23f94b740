use thiserror::Error;

/// Errors from conversation storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("filesystem error: {0}")]
    Io(String),

    #[error("corrupt conversation record '{key}': {message}")]
    Corrupt { key: String, message: String },

    #[error("object store error (HTTP {status}, {code}): {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },

    #[error("object store request failed: {0}")]
    Transport(String),

    #[error("missing credentials: {0}")]
    Credentials(String),
}

/// The single error kind surfaced for any model-call failure.
///
/// Carries the provider's diagnostic message verbatim.
#[derive(Debug, Error)]
#[error("model invocation failed: {message}")]
pub struct ModelInvocationError {
    pub message: String,
}

/// Errors from loading the persona at startup.
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("persona file '{path}' could not be read: {message}")]
    Unreadable { path: String, message: String },

    #[error("persona facts '{path}' are not valid JSON: {message}")]
    InvalidFacts { path: String, message: String },
}

/// Terminal outcome of a failed chat turn.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("invalid session id: '{0}'")]
    InvalidSessionId(String),

    /// Loading the log failed; no model call was made.
    #[error("failed to load conversation: {0}")]
    Storage(#[source] StorageError),

    #[error(transparent)]
    ModelInvocation(#[from] ModelInvocationError),

    /// Saving the log failed after the reply was computed.
    #[error("failed to save conversation: {0}")]
    Persist(#[source] StorageError),
}
