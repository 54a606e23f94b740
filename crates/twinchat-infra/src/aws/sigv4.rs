//! AWS Signature Version 4 request signing.
//!
//! Provides:
//! - `uri_encode()` -- RFC 3986 encoding as SigV4 defines it
//! - `sign()` -- computes the `Authorization` and `x-amz-*` headers for a request
//!
//! Only what S3 object GET/PUT and Bedrock Converse need is covered: no query
//! strings, a fixed set of signed headers.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::digest::Output;
use sha2::{Digest, Sha256};

use super::AwsCredentials;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Per-request signing inputs.
pub struct SigningParams<'a> {
    pub credentials: &'a AwsCredentials,
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
    /// Sign and send `x-amz-content-sha256` (required by S3).
    pub content_sha256_header: bool,
}

/// A request as seen by the signer.
pub struct SignableRequest<'a> {
    pub method: &'a str,
    /// Value of the `Host` header (`host[:port]`).
    pub host: &'a str,
    /// Path exactly as sent on the wire, already URI-encoded once.
    pub path: &'a str,
    pub payload: &'a [u8],
}

/// URI-encode `input`: unreserved characters pass through, everything else
/// becomes `%XX` (uppercase hex).
pub fn uri_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &str) -> Output<Sha256> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes()
}

/// Derive the signing key for a date/region/service scope.
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Output<Sha256> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date);
    let k_region = hmac_sha256(&k_date, region);
    let k_service = hmac_sha256(&k_region, service);
    hmac_sha256(&k_service, "aws4_request")
}

/// Canonical URI for the path. S3 uses the wire path as-is; every other
/// service encodes each segment a second time.
fn canonical_uri(path: &str, service: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    if service == "s3" {
        return path.to_string();
    }
    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// Sign `request` and return the headers to attach, `authorization` last.
pub fn sign(request: &SignableRequest<'_>, params: &SigningParams<'_>) -> Vec<(String, String)> {
    let amz_date = params.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date = params.time.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(request.payload);

    // Sorted by header name.
    let mut headers: Vec<(String, String)> = vec![("host".to_string(), request.host.to_string())];
    if params.content_sha256_header {
        headers.push(("x-amz-content-sha256".to_string(), payload_hash.clone()));
    }
    headers.push(("x-amz-date".to_string(), amz_date.clone()));
    if let Some(token) = &params.credentials.session_token {
        headers.push((
            "x-amz-security-token".to_string(),
            token.expose_secret().to_string(),
        ));
    }

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{}\n", value.trim()))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        request.method,
        canonical_uri(request.path, params.service),
        canonical_headers,
        signed_headers,
        payload_hash
    );

    let scope = format!("{date}/{}/{}/aws4_request", params.region, params.service);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(
        params.credentials.secret_access_key.expose_secret(),
        &date,
        params.region,
        params.service,
    );
    let signature = format!("{:x}", hmac_sha256(&key, &string_to_sign));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        params.credentials.access_key_id
    );

    // `host` is set by the HTTP client from the URL.
    let mut out: Vec<(String, String)> = headers.into_iter().filter(|(name, _)| name != "host").collect();
    out.push(("authorization".to_string(), authorization));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use secrecy::SecretString;

    fn example_credentials(token: Option<&str>) -> AwsCredentials {
        AwsCredentials::new(
            "AKIDEXAMPLE",
            SecretString::from("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
            token.map(SecretString::from),
        )
    }

    #[test]
    fn test_uri_encode() {
        assert_eq!(uri_encode("amazon.nova-lite-v1:0"), "amazon.nova-lite-v1%3A0");
        assert_eq!(uri_encode("a b~c"), "a%20b~c");
        assert_eq!(uri_encode("%3A"), "%253A");
    }

    #[test]
    fn test_canonical_uri_double_encodes_outside_s3() {
        assert_eq!(
            canonical_uri("/model/amazon.nova-lite-v1%3A0/converse", "bedrock"),
            "/model/amazon.nova-lite-v1%253A0/converse"
        );
        assert_eq!(canonical_uri("/bucket/abc.json", "s3"), "/bucket/abc.json");
        assert_eq!(canonical_uri("", "s3"), "/");
    }

    #[test]
    fn test_signing_key_matches_aws_example() {
        // From the AWS "deriving the signing key" documentation example.
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            format!("{key:x}"),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_get_vanilla_vector() {
        // AWS SigV4 test suite: get-vanilla.
        let creds = example_credentials(None);
        let params = SigningParams {
            credentials: &creds,
            region: "us-east-1",
            service: "service",
            time: Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap(),
            content_sha256_header: false,
        };
        let request = SignableRequest {
            method: "GET",
            host: "example.amazonaws.com",
            path: "/",
            payload: b"",
        };

        let headers = sign(&request, &params);
        let auth = &headers.last().unwrap().1;
        assert_eq!(
            auth,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
        assert!(headers.contains(&("x-amz-date".to_string(), "20150830T123600Z".to_string())));
    }

    #[test]
    fn test_s3_headers_include_payload_hash_and_token() {
        let creds = example_credentials(Some("token-123"));
        let params = SigningParams {
            credentials: &creds,
            region: "eu-west-1",
            service: "s3",
            time: Utc::now(),
            content_sha256_header: true,
        };
        let request = SignableRequest {
            method: "PUT",
            host: "bucket.s3.eu-west-1.amazonaws.com",
            path: "/abc.json",
            payload: b"[]",
        };

        let headers = sign(&request, &params);
        let names: Vec<&str> = headers.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            ["x-amz-content-sha256", "x-amz-date", "x-amz-security-token", "authorization"]
        );
        assert_eq!(headers[0].1, sha256_hex(b"[]"));
        assert!(headers[3].1.contains(
            "SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-security-token"
        ));
        assert!(headers[3].1.contains("/eu-west-1/s3/aws4_request"));
    }
}
