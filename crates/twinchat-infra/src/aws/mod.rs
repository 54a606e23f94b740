//! AWS plumbing shared by the S3 store and the Bedrock provider.
//!
//! Credentials are read once at startup and wrapped in [`SecretString`] so
//! they never show up in `Debug` output or logs.

pub mod sigv4;

use std::time::Duration;

use secrecy::SecretString;

/// Static AWS credentials (access key pair plus optional session token).
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
}

impl AwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: SecretString,
        session_token: Option<SecretString>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key,
            session_token,
        }
    }

    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// `AWS_SESSION_TOKEN`. Returns `None` unless both keys are set.
    pub fn from_env() -> Option<Self> {
        let access_key_id = non_empty_env("AWS_ACCESS_KEY_ID")?;
        let secret = non_empty_env("AWS_SECRET_ACCESS_KEY")?;
        let session_token = non_empty_env("AWS_SESSION_TOKEN").map(SecretString::from);

        Some(Self::new(access_key_id, SecretString::from(secret), session_token))
    }
}

// AwsCredentials intentionally does NOT derive Debug; only the key id is
// safe to print.
impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("session_token", &self.session_token.is_some())
            .finish_non_exhaustive()
    }
}

/// Read the Bedrock API key (`AWS_BEARER_TOKEN_BEDROCK`), if configured.
pub fn bedrock_bearer_token_from_env() -> Option<SecretString> {
    non_empty_env("AWS_BEARER_TOKEN_BEDROCK").map(SecretString::from)
}

/// Build the shared HTTP client used for every outbound AWS call.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secret() {
        let creds = AwsCredentials::new(
            "AKIDEXAMPLE",
            SecretString::from("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
            Some(SecretString::from("session")),
        );
        let out = format!("{creds:?}");
        assert!(out.contains("AKIDEXAMPLE"));
        assert!(!out.contains("wJalr"));
        assert!(!out.contains("session\""));
    }
}
