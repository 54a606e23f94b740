//! Session and turn types for twinchat.
//!
//! A session is an independent conversation thread identified by an opaque
//! string id. It owns exactly one append-only log of [`Turn`]s.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Longest client-supplied session id accepted, in bytes.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Identifier of a chat session.
///
/// Client-supplied ids are opaque: any non-empty string up to
/// [`MAX_SESSION_ID_LEN`] bytes. Generated ids are UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for this session's log: `{id}.json`.
    ///
    /// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so the key is always
    /// a single flat path segment. Plain ids map to themselves.
    pub fn storage_key(&self) -> String {
        let mut key = String::with_capacity(self.0.len() + 5);
        for b in self.0.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                key.push(b as char);
            } else {
                key.push_str(&format!("%{b:02X}"));
            }
        }
        key.push_str(".json");
        key
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.len() <= MAX_SESSION_ID_LEN {
            Ok(Self(s.to_string()))
        } else {
            Err(ChatError::InvalidSessionId(s.to_string()))
        }
    }
}

/// One role-tagged message within a session's log.
///
/// The timestamp is kept as the exact ISO-8601 string that was stored, so a
/// log written by another tool round-trips byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
}

impl Turn {
    /// A user turn stamped at `at`.
    pub fn user(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: format_timestamp(at),
        }
    }

    /// An assistant turn stamped at `at`.
    pub fn assistant(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: format_timestamp(at),
        }
    }

    /// The stored timestamp, only when it carries an explicit UTC offset.
    pub fn zoned_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Parse the stored timestamp, if it is a well-formed ISO-8601 value.
    ///
    /// Offset-less values (`2025-01-01T10:00:00.5`) are read as UTC, which is
    /// only approximate: legacy logs were stamped in the writer's local time.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Some(dt) = self.zoned_timestamp() {
            return Some(dt);
        }
        chrono::NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Render a timestamp the way turns are stamped: RFC 3339, UTC, microseconds.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Result of one successful chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: String,
    pub session_id: SessionId,
}
