//! BedrockConverseProvider -- concrete [`LlmProvider`] for the Bedrock
//! Converse API.
//!
//! Two authentication modes are supported:
//! - a Bedrock API key (`AWS_BEARER_TOKEN_BEDROCK`), sent as a Bearer token
//! - static AWS credentials, with each request signed using SigV4
//!
//! Secrets are held as [`SecretString`] and only exposed while building
//! request headers.

use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};

use twinchat_core::llm::provider::LlmProvider;
use twinchat_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::types::{BedrockErrorBody, ConverseRequest, ConverseResponse};
use crate::aws::AwsCredentials;
use crate::aws::sigv4::{self, SignableRequest, SigningParams};

/// How requests to Bedrock are authenticated.
pub enum BedrockAuth {
    Bearer(SecretString),
    SigV4(AwsCredentials),
}

impl BedrockAuth {
    fn label(&self) -> &'static str {
        match self {
            BedrockAuth::Bearer(_) => "bearer",
            BedrockAuth::SigV4(_) => "sigv4",
        }
    }
}

/// Bedrock Converse provider bound to one region.
///
/// The model id comes from each [`CompletionRequest`].
pub struct BedrockConverseProvider {
    client: reqwest::Client,
    auth: BedrockAuth,
    region: String,
}

impl BedrockConverseProvider {
    /// Prefix carried by Bedrock API keys as issued by the console.
    const KEY_PREFIX: &'static str = "bedrock-api-key-";

    /// Create a provider.
    ///
    /// With a Bearer key, a `bedrock-api-key-` prefix is stripped and, if the
    /// token's embedded credential scope names a region, that region wins
    /// over `region`.
    pub fn new(client: reqwest::Client, auth: BedrockAuth, region: String) -> Self {
        let (auth, region) = match auth {
            BedrockAuth::Bearer(key) => {
                let raw = key.expose_secret();
                let token = raw.strip_prefix(Self::KEY_PREFIX).unwrap_or(raw).to_string();
                let effective_region = match detect_region_from_token(&token) {
                    Some(detected) if detected != region => {
                        tracing::warn!(configured = %region, detected = %detected, "Bedrock key is scoped to a different region; using the key's region");
                        detected
                    }
                    _ => region,
                };
                (BedrockAuth::Bearer(SecretString::from(token)), effective_region)
            }
            other => (other, region),
        };

        Self {
            client,
            auth,
            region,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn host(&self) -> String {
        format!("bedrock-runtime.{}.amazonaws.com", self.region)
    }

    /// Wire path for a Converse call; the model id is encoded as one segment.
    fn converse_path(model_id: &str) -> String {
        format!("/model/{}/converse", sigv4::uri_encode(model_id))
    }

    fn converse_url(&self, model_id: &str) -> Result<Url, LlmError> {
        let raw = format!("https://{}{}", self.host(), Self::converse_path(model_id));
        Url::parse(&raw).map_err(|e| LlmError::InvalidRequest(format!("invalid model URL: {e}")))
    }
}

/// Try to extract the AWS region from a base64-encoded presigned URL token.
///
/// The token decodes to a URL containing
/// `X-Amz-Credential=<key>/<date>/<region>/bedrock/aws4_request`.
fn detect_region_from_token(token: &str) -> Option<String> {
    use base64::Engine;
    let decoded = base64::engine::general_purpose::STANDARD.decode(token).ok()?;
    let text = String::from_utf8(decoded).ok()?;

    let marker = "X-Amz-Credential=";
    let cred_start = text.find(marker)?;
    let cred_value = &text[cred_start + marker.len()..];
    // The slashes may be percent-encoded inside the presigned URL.
    let cred_value = cred_value.replace("%2F", "/");
    let region = cred_value.split('/').nth(2)?.split('&').next()?;
    (!region.is_empty()).then(|| region.to_string())
}

/// Map a non-success Bedrock response to an [`LlmError`].
///
/// The message carries the `x-amzn-errortype` code (if any) followed by the
/// body's message, so it reads like `AccessDeniedException: ...`.
fn classify_error(status: StatusCode, headers: &HeaderMap, body: &str) -> LlmError {
    let error_type = headers
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(':').next().unwrap_or(v).to_string());
    let detail = serde_json::from_str::<BedrockErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string());

    let message = match (&error_type, detail.is_empty()) {
        (Some(kind), false) => format!("{kind}: {detail}"),
        (Some(kind), true) => kind.clone(),
        (None, false) => format!("HTTP {status}: {detail}"),
        (None, true) => format!("HTTP {status}"),
    };

    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed(message),
        429 => LlmError::RateLimited(message),
        400 | 404 | 422 => LlmError::InvalidRequest(message),
        _ => LlmError::Provider { message },
    }
}

// BedrockConverseProvider intentionally does NOT derive Debug.

impl LlmProvider for BedrockConverseProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = self.converse_url(&request.model)?;
        let body = serde_json::to_vec(&ConverseRequest::from(request))
            .map_err(|e| LlmError::InvalidRequest(format!("failed to encode request: {e}")))?;

        tracing::debug!(url = %url, region = %self.region, auth = self.auth.label(), "Bedrock converse request");

        let mut http = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json");

        match &self.auth {
            BedrockAuth::Bearer(token) => {
                http = http.bearer_auth(token.expose_secret());
            }
            BedrockAuth::SigV4(credentials) => {
                let host = self.host();
                let signed = sigv4::sign(
                    &SignableRequest {
                        method: "POST",
                        host: &host,
                        path: url.path(),
                        payload: &body,
                    },
                    &SigningParams {
                        credentials,
                        region: &self.region,
                        service: "bedrock",
                        time: Utc::now(),
                        content_sha256_header: false,
                    },
                );
                for (name, value) in signed {
                    http = http.header(name, value);
                }
            }
        }

        let response = http.body(body).send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Transport(format!("request timed out: {e}"))
            } else {
                LlmError::Transport(format!("HTTP request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, "Bedrock API error response");
            return Err(classify_error(status, &headers, &error_body));
        }

        let converse: ConverseResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = converse
            .first_text()
            .ok_or_else(|| {
                LlmError::Deserialization("response contained no text content".to_string())
            })?
            .to_string();

        Ok(CompletionResponse {
            content,
            stop_reason: converse.stop_reason,
            usage: Usage {
                input_tokens: converse.usage.input_tokens,
                output_tokens: converse.usage.output_tokens,
            },
        })
    }
}
