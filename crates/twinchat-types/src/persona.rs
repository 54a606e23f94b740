//! Persona configuration for the digital twin.
//!
//! Loaded once at startup and never mutated. It is read-only input to the
//! system prompt and has no further lifecycle.

use serde::{Deserialize, Serialize};

/// Placeholder used when the profile document does not exist.
pub const PROFILE_MISSING: &str = "LinkedIn profile not available";

/// Placeholder used when the profile document exists but yields no text.
pub const PROFILE_UNREADABLE: &str = "LinkedIn PDF contains unreadable text.";

/// The person the assistant speaks as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Free-text biography.
    pub summary: String,
    /// Free-text guidance on tone and phrasing.
    pub style: String,
    /// Structured fact table.
    pub facts: serde_json::Value,
    /// Profile text extracted from a document, or one of the placeholders.
    pub profile: String,
}

impl Persona {
    /// Display name taken from the fact table (`full_name`, then `name`).
    pub fn name(&self) -> Option<&str> {
        ["full_name", "name"]
            .iter()
            .find_map(|key| self.facts.get(*key).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
