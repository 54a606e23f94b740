//! LLM provider implementations.
//!
//! Contains the Bedrock Converse implementation of the [`LlmProvider`] trait
//! defined in `twinchat-core`, plus a factory ([`create_provider`]) that picks
//! the authentication mode from whatever credentials are available.
//!
//! [`LlmProvider`]: twinchat_core::llm::provider::LlmProvider

pub mod bedrock;

use secrecy::SecretString;

use twinchat_core::llm::box_provider::BoxLlmProvider;
use twinchat_types::config::ModelConfig;
use twinchat_types::llm::LlmError;

use crate::aws::AwsCredentials;

use self::bedrock::{BedrockAuth, BedrockConverseProvider};

/// Create a [`BoxLlmProvider`] for the configured region.
///
/// A Bedrock API key takes precedence over static AWS credentials.
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] if neither is available.
pub fn create_provider(
    config: &ModelConfig,
    http: reqwest::Client,
    bearer_token: Option<SecretString>,
    credentials: Option<AwsCredentials>,
) -> Result<BoxLlmProvider, LlmError> {
    let auth = match (bearer_token, credentials) {
        (Some(token), _) => BedrockAuth::Bearer(token),
        (None, Some(credentials)) => BedrockAuth::SigV4(credentials),
        (None, None) => {
            return Err(LlmError::AuthenticationFailed(
                "set AWS_BEARER_TOKEN_BEDROCK or AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY"
                    .to_string(),
            ));
        }
    };

    let provider = BedrockConverseProvider::new(http, auth, config.region.clone());
    tracing::info!(model = %config.model_id, region = %provider.region(), "Bedrock provider ready");
    Ok(BoxLlmProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinchat_core::llm::provider::LlmProvider;

    fn config() -> ModelConfig {
        ModelConfig {
            model_id: "amazon.nova-lite-v1:0".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_create_provider_with_bearer() {
        let provider = create_provider(
            &config(),
            reqwest::Client::new(),
            Some(SecretString::from("token")),
            None,
        )
        .unwrap();
        assert_eq!(provider.name(), "bedrock");
    }

    #[test]
    fn test_create_provider_with_static_credentials() {
        let creds = AwsCredentials::new("AKID", SecretString::from("secret"), None);
        let provider = create_provider(&config(), reqwest::Client::new(), None, Some(creds)).unwrap();
        assert_eq!(provider.name(), "bedrock");
    }

    #[test]
    fn test_create_provider_without_credentials() {
        let result = create_provider(&config(), reqwest::Client::new(), None, None);
        assert!(matches!(result, Err(LlmError::AuthenticationFailed(_))));
    }
}
