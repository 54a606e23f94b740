//! S3 conversation store.
//!
//! Objects live at `{bucket}/{session_id}.json`. Requests go through the
//! shared `reqwest` client and are signed with SigV4. Only a 404 carrying
//! `NoSuchKey` means "no conversation yet"; every other failure is an error.

use chrono::Utc;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;

use twinchat_core::storage::store::ConversationStore;
use twinchat_types::chat::{SessionId, Turn};
use twinchat_types::error::StorageError;

use super::{decode_log, encode_log};
use crate::aws::AwsCredentials;
use crate::aws::sigv4::{self, SignableRequest, SigningParams};

/// Conversation store backed by an S3 bucket.
#[derive(Debug)]
pub struct S3ConversationStore {
    client: reqwest::Client,
    bucket: String,
    region: String,
    /// Custom endpoint (S3-compatible services); switches to path-style URLs.
    endpoint: Option<String>,
    credentials: AwsCredentials,
}

impl S3ConversationStore {
    pub fn new(
        client: reqwest::Client,
        bucket: String,
        region: String,
        endpoint: Option<String>,
        credentials: AwsCredentials,
    ) -> Self {
        Self {
            client,
            bucket,
            region,
            endpoint,
            credentials,
        }
    }

    /// URL of the object holding `key`.
    pub fn object_url(&self, key: &str) -> Result<Url, StorageError> {
        let key = sigv4::uri_encode(key);
        let raw = match &self.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{key}",
                endpoint.trim_end_matches('/'),
                sigv4::uri_encode(&self.bucket)
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.bucket, self.region
            ),
        };
        Url::parse(&raw)
            .map_err(|e| StorageError::Transport(format!("invalid S3 URL '{raw}': {e}")))
    }

    async fn send(
        &self,
        method: Method,
        key: &str,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, StorageError> {
        let url = self.object_url(key)?;
        let host = host_header(&url)?;

        let signed = sigv4::sign(
            &SignableRequest {
                method: method.as_str(),
                host: &host,
                path: url.path(),
                payload: &body,
            },
            &SigningParams {
                credentials: &self.credentials,
                region: &self.region,
                service: "s3",
                time: Utc::now(),
                content_sha256_header: true,
            },
        );

        let mut request = self.client.request(method.clone(), url);
        for (name, value) in signed {
            request = request.header(name, value);
        }
        if method == Method::PUT {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))
    }
}

/// `Host` header value for a URL, including a non-default port.
fn host_header(url: &Url) -> Result<String, StorageError> {
    let host = url
        .host_str()
        .ok_or_else(|| StorageError::Transport(format!("S3 URL has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// `<Error>` document S3 returns with a failed request.
#[derive(Debug, Default, Deserialize)]
struct S3ErrorBody {
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

impl S3ErrorBody {
    /// Parse an error body; empty or non-XML bodies yield no fields.
    fn parse(body: &str) -> Self {
        quick_xml::de::from_str(body).unwrap_or_default()
    }
}

/// Classify a non-success S3 response.
///
/// Returns `Ok(None)` only for a missing key; everything else is an error.
fn classify_failure(status: StatusCode, body: &str) -> Result<Option<Vec<Turn>>, StorageError> {
    let error = S3ErrorBody::parse(body);
    if status == StatusCode::NOT_FOUND && error.code.as_deref() == Some("NoSuchKey") {
        return Ok(None);
    }
    Err(remote_error(status, error))
}

fn remote_error(status: StatusCode, error: S3ErrorBody) -> StorageError {
    StorageError::Remote {
        status: status.as_u16(),
        code: error.code.unwrap_or_else(|| "UnknownError".to_string()),
        message: error
            .message
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
    }
}

impl ConversationStore for S3ConversationStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<Vec<Turn>>, StorageError> {
        let key = session_id.storage_key();
        let response = self.send(Method::GET, &key, Vec::new()).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if status.is_success() {
            return decode_log(&key, &body).map(Some);
        }

        let text = String::from_utf8_lossy(&body);
        let outcome = classify_failure(status, &text);
        if let Err(ref e) = outcome {
            tracing::warn!(bucket = %self.bucket, key = %key, error = %e, "S3 read failed");
        }
        outcome
    }

    async fn put(&self, session_id: &SessionId, turns: &[Turn]) -> Result<(), StorageError> {
        let key = session_id.storage_key();
        let body = encode_log(&key, turns)?;
        let response = self.send(Method::PUT, &key, body).await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(bucket = %self.bucket, key = %key, turns = turns.len(), "Saved conversation");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let err = remote_error(status, S3ErrorBody::parse(&text));
        tracing::warn!(bucket = %self.bucket, key = %key, error = %err, "S3 write failed");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn store(endpoint: Option<&str>) -> S3ConversationStore {
        S3ConversationStore::new(
            reqwest::Client::new(),
            "twin-memory".to_string(),
            "eu-west-1".to_string(),
            endpoint.map(str::to_string),
            AwsCredentials::new("AKID", SecretString::from("secret"), None),
        )
    }

    #[test]
    fn test_virtual_hosted_url() {
        let url = store(None).object_url("abc.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://twin-memory.s3.eu-west-1.amazonaws.com/abc.json"
        );
        assert_eq!(host_header(&url).unwrap(), "twin-memory.s3.eu-west-1.amazonaws.com");
    }

    #[test]
    fn test_custom_endpoint_uses_path_style() {
        let url = store(Some("http://localhost:9000/")).object_url("abc.json").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/twin-memory/abc.json");
        assert_eq!(url.path(), "/twin-memory/abc.json");
        assert_eq!(host_header(&url).unwrap(), "localhost:9000");
    }

    #[test]
    fn test_no_such_key_is_absent() {
        let body = "<?xml version=\"1.0\"?><Error><Code>NoSuchKey</Code>\
                    <Message>The specified key does not exist.</Message></Error>";
        assert!(classify_failure(StatusCode::NOT_FOUND, body).unwrap().is_none());
    }

    #[test]
    fn test_access_denied_is_error() {
        let body = "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>";
        let err = classify_failure(StatusCode::FORBIDDEN, body).unwrap_err();
        match err {
            StorageError::Remote {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 403);
                assert_eq!(code, "AccessDenied");
                assert_eq!(message, "Access Denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_bucket_404_is_error() {
        let body = "<Error><Code>NoSuchBucket</Code><Message>nope</Message></Error>";
        assert!(classify_failure(StatusCode::NOT_FOUND, body).is_err());
    }

    #[test]
    fn test_error_message_entities_are_decoded() {
        let body = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>InvalidArgument</Code>\
                    <Message>Bad &quot;key&quot; &amp; value</Message><RequestId>4442587FB7D0A2F9</RequestId></Error>";
        let err = classify_failure(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Remote { status: 400, ref code, ref message }
                if code == "InvalidArgument" && message == "Bad \"key\" & value"
        ));
    }

    #[test]
    fn test_non_xml_error_body_uses_status_reason() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "<html>proxy error").unwrap_err();
        assert!(matches!(
            err,
            StorageError::Remote { status: 502, ref code, .. } if code == "UnknownError"
        ));
    }

    #[test]
    fn test_empty_error_body_uses_status_reason() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "").unwrap_err();
        assert!(matches!(
            err,
            StorageError::Remote { status: 500, ref code, ref message }
                if code == "UnknownError" && message == "Internal Server Error"
        ));
    }
}
