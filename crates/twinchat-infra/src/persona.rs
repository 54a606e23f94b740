//! Persona file loading.
//!
//! The persona directory holds:
//! - `summary.txt` -- free-text biography (required)
//! - `style.txt` -- tone and phrasing guidance (required)
//! - `facts.json` -- structured fact table (required, any JSON value)
//! - `linkedin.pdf` -- profile document (optional, best-effort)

use std::path::Path;

use twinchat_types::error::PersonaError;
use twinchat_types::persona::{PROFILE_MISSING, PROFILE_UNREADABLE, Persona};

pub const SUMMARY_FILE: &str = "summary.txt";
pub const STYLE_FILE: &str = "style.txt";
pub const FACTS_FILE: &str = "facts.json";
pub const PROFILE_FILE: &str = "linkedin.pdf";

async fn read_required(path: &Path) -> Result<String, PersonaError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PersonaError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Load the persona from `dir`.
///
/// A missing or unparsable profile document never fails the load; it is
/// replaced by a placeholder string.
pub async fn load_persona(dir: &Path) -> Result<Persona, PersonaError> {
    let summary = read_required(&dir.join(SUMMARY_FILE)).await?;
    let style = read_required(&dir.join(STYLE_FILE)).await?;

    let facts_path = dir.join(FACTS_FILE);
    let facts_raw = read_required(&facts_path).await?;
    let facts: serde_json::Value =
        serde_json::from_str(&facts_raw).map_err(|e| PersonaError::InvalidFacts {
            path: facts_path.display().to_string(),
            message: e.to_string(),
        })?;

    let profile = load_profile_text(&dir.join(PROFILE_FILE)).await;

    let persona = Persona {
        summary,
        style,
        facts,
        profile,
    };
    tracing::info!(
        dir = %dir.display(),
        name = persona.name().unwrap_or("<unnamed>"),
        profile_chars = persona.profile.len(),
        "Loaded persona"
    );
    Ok(persona)
}

/// Extract the profile document's text.
///
/// Returns [`PROFILE_MISSING`] if the file does not exist and
/// [`PROFILE_UNREADABLE`] if it exists but yields no text.
pub async fn load_profile_text(path: &Path) -> String {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No profile document found");
            return PROFILE_MISSING.to_string();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read profile document");
            return PROFILE_UNREADABLE.to_string();
        }
    };

    // pdf_extract is blocking and may panic on malformed input; run it on the
    // blocking pool so a panic surfaces as a JoinError.
    let extracted =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

    match extracted {
        Ok(Ok(text)) if !text.trim().is_empty() => text,
        Ok(Ok(_)) => {
            tracing::warn!(path = %path.display(), "Profile document contains no extractable text");
            PROFILE_UNREADABLE.to_string()
        }
        Ok(Err(e)) => {
            tracing::warn!(path = %path.display(), error = %e, "Profile extraction failed");
            PROFILE_UNREADABLE.to_string()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Profile extraction task panicked");
            PROFILE_UNREADABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_required(dir: &Path, facts: &str) {
        std::fs::write(dir.join(SUMMARY_FILE), "Data engineer in Lisbon.").unwrap();
        std::fs::write(dir.join(STYLE_FILE), "Warm, concise.").unwrap();
        std::fs::write(dir.join(FACTS_FILE), facts).unwrap();
    }

    #[tokio::test]
    async fn test_load_without_profile_uses_placeholder() {
        let dir = tempdir().unwrap();
        write_required(dir.path(), r#"{"full_name": "Ada Lovelace", "city": "London"}"#);

        let persona = load_persona(dir.path()).await.unwrap();
        assert_eq!(persona.summary, "Data engineer in Lisbon.");
        assert_eq!(persona.style, "Warm, concise.");
        assert_eq!(persona.facts["city"], "London");
        assert_eq!(persona.profile, PROFILE_MISSING);
        assert_eq!(persona.name(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_garbage_profile_is_unreadable() {
        let dir = tempdir().unwrap();
        write_required(dir.path(), "{}");
        std::fs::write(dir.path().join(PROFILE_FILE), b"this is not a pdf").unwrap();

        let persona = load_persona(dir.path()).await.unwrap();
        assert_eq!(persona.profile, PROFILE_UNREADABLE);
    }

    #[tokio::test]
    async fn test_empty_profile_is_unreadable() {
        let dir = tempdir().unwrap();
        write_required(dir.path(), "{}");
        std::fs::write(dir.path().join(PROFILE_FILE), b"").unwrap();

        assert_eq!(
            load_profile_text(&dir.path().join(PROFILE_FILE)).await,
            PROFILE_UNREADABLE
        );
    }

    #[tokio::test]
    async fn test_missing_summary_fails() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STYLE_FILE), "x").unwrap();
        std::fs::write(dir.path().join(FACTS_FILE), "{}").unwrap();

        let err = load_persona(dir.path()).await.unwrap_err();
        match err {
            PersonaError::Unreadable { path, .. } => assert!(path.ends_with(SUMMARY_FILE)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_facts_fails() {
        let dir = tempdir().unwrap();
        write_required(dir.path(), "{ not json");

        let err = load_persona(dir.path()).await.unwrap_err();
        assert!(matches!(err, PersonaError::InvalidFacts { .. }));
    }
}
