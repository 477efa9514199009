//! Tinify (TinyPNG) API client
//!
//! Implementation of `CompressionService` for <https://tinypng.com/developers>.
//! An upload to `/shrink` answers 201 with a `Location` naming the
//! compressed result, which is then downloaded with the same credentials.

use crate::config::tinify::{AUTH_USER, COMPRESSION_COUNT_HEADER, DEFAULT_BASE_URL};
use crate::error::{CompressError, Result};
use crate::network::HttpClient;

use super::traits::{Compressed, CompressionService};

use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, LOCATION};
use serde::Deserialize;

// =============================================================================
// Internal API response types (serde)
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

/// Human-readable detail from an error response body
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(e) if !e.message.is_empty() && !e.error.is_empty() => {
            format!("{}: {}", e.error, e.message)
        }
        Ok(e) if !e.message.is_empty() => e.message,
        Ok(e) if !e.error.is_empty() => e.error,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => "no details".to_string(),
    }
}

fn compression_count(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(COMPRESSION_COUNT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Pass 2xx responses through, classify everything else
fn check_status(resp: Response) -> std::result::Result<Response, CompressError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(CompressError::from_status(status.as_u16(), error_detail(&body)))
}

// =============================================================================
// TinifyClient
// =============================================================================

/// Tinify API client authenticated by an API key
pub struct TinifyClient {
    http: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl TinifyClient {
    /// Create a client for the public API with its own connection pool
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(&HttpClient::new()?, api_key))
    }

    /// Create a client that shares an existing connection pool
    pub fn with_client(http: &HttpClient, api_key: impl Into<String>) -> Self {
        Self {
            http: http.inner().clone(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a custom API root (proxies, local servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full API URL from an endpoint path or absolute location
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Upload the image, returning the output location and usage count
    fn shrink(&self, data: &[u8]) -> std::result::Result<(String, Option<u32>), CompressError> {
        let resp = self
            .http
            .post(self.url("/shrink"))
            .basic_auth(AUTH_USER, Some(&self.api_key))
            .body(data.to_vec())
            .send()
            .map_err(|e| CompressError::from_transport(&e))?;

        let count = compression_count(resp.headers());
        let resp = check_status(resp)?;

        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| CompressError::Unknown("response has no Location header".to_string()))?;

        Ok((self.url(location), count))
    }

    /// Download the compressed result
    fn fetch_output(&self, location: &str) -> std::result::Result<Vec<u8>, CompressError> {
        let resp = self
            .http
            .get(location)
            .basic_auth(AUTH_USER, Some(&self.api_key))
            .send()
            .map_err(|e| CompressError::from_transport(&e))?;
        let resp = check_status(resp)?;
        let bytes = resp.bytes().map_err(|e| CompressError::from_transport(&e))?;
        Ok(bytes.to_vec())
    }
}

impl CompressionService for TinifyClient {
    fn name(&self) -> &'static str {
        "Tinify"
    }

    fn compress(&self, data: &[u8]) -> std::result::Result<Compressed, CompressError> {
        let (location, compression_count) = self.shrink(data)?;
        let data = self.fetch_output(&location)?;
        Ok(Compressed {
            data,
            compression_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::client::tests::{http_response, request_body, request_head, StubServer};
    use reqwest::header::HeaderValue;

    // ---- error_detail ----

    #[test]
    fn test_error_detail_full_body() {
        let body = r#"{"error":"Unauthorized","message":"Credentials are invalid."}"#;
        assert_eq!(error_detail(body), "Unauthorized: Credentials are invalid.");
    }

    #[test]
    fn test_error_detail_message_only() {
        assert_eq!(error_detail(r#"{"message":"Too large"}"#), "Too large");
    }

    #[test]
    fn test_error_detail_plain_text() {
        assert_eq!(error_detail("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_error_detail_empty() {
        assert_eq!(error_detail(""), "no details");
    }

    // ---- compression_count ----

    #[test]
    fn test_compression_count_header() {
        let mut headers = HeaderMap::new();
        headers.insert("compression-count", HeaderValue::from_static("42"));
        assert_eq!(compression_count(&headers), Some(42));
    }

    #[test]
    fn test_compression_count_missing_or_garbage() {
        let mut headers = HeaderMap::new();
        assert_eq!(compression_count(&headers), None);
        headers.insert("compression-count", HeaderValue::from_static("many"));
        assert_eq!(compression_count(&headers), None);
    }

    // ---- client construction ----

    #[test]
    fn test_client_creation() {
        let client = TinifyClient::new("key").unwrap();
        assert_eq!(client.base_url(), "https://api.tinify.com");
        assert_eq!(client.name(), "Tinify");
    }

    #[test]
    fn test_url_building() {
        let client = TinifyClient::new("key")
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(client.url("/shrink"), "http://localhost:8080/shrink");
        assert_eq!(
            client.url("https://api.tinify.com/output/abc"),
            "https://api.tinify.com/output/abc"
        );
    }

    // ---- protocol against a local server ----

    // base64("api:key")
    const AUTH_HEADER: &str = "authorization: basic yxbpomtleq==";

    fn local_client(server: &StubServer) -> TinifyClient {
        TinifyClient::with_client(&HttpClient::new().unwrap(), "key")
            .with_base_url(server.base_url.clone())
    }

    #[test]
    fn test_shrink_then_download_output() {
        let server = StubServer::serve(vec![
            http_response(
                "201 Created",
                &[("Location", "/output/abc123"), ("Compression-Count", "12")],
                br#"{"input":{"size":9},"output":{"size":8}}"#,
            ),
            http_response("200 OK", &[("Content-Type", "image/png")], b"tiny-png"),
        ]);
        let client = local_client(&server);

        let compressed = client.compress(b"raw-image").unwrap();

        assert_eq!(compressed.data, b"tiny-png");
        assert_eq!(compressed.compression_count, Some(12));

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        let upload = request_head(&requests[0]);
        assert!(upload.starts_with("post /shrink http/1.1"));
        assert!(upload.contains(AUTH_HEADER));
        assert_eq!(request_body(&requests[0]), b"raw-image");
        let download = request_head(&requests[1]);
        assert!(download.starts_with("get /output/abc123 http/1.1"));
        assert!(download.contains(AUTH_HEADER));
    }

    #[test]
    fn test_missing_location_is_unknown() {
        let server = StubServer::serve(vec![http_response("201 Created", &[], b"{}")]);
        let client = local_client(&server);

        let result = client.compress(b"raw-image");

        assert!(matches!(result, Err(CompressError::Unknown(_))));
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn test_error_statuses_are_classified() {
        let cases = [
            (
                "401 Unauthorized",
                r#"{"error":"Unauthorized","message":"Credentials are invalid."}"#,
                CompressError::Account("Unauthorized: Credentials are invalid.".into()),
            ),
            (
                "429 Too Many Requests",
                r#"{"error":"TooManyRequests","message":"Your monthly limit has been exceeded."}"#,
                CompressError::Account(
                    "TooManyRequests: Your monthly limit has been exceeded.".into(),
                ),
            ),
            (
                "415 Unsupported Media Type",
                r#"{"error":"Unsupported media type","message":"File type is not supported."}"#,
                CompressError::Client(
                    "Unsupported media type: File type is not supported.".into(),
                ),
            ),
            (
                "503 Service Unavailable",
                "Service Unavailable",
                CompressError::Server("Service Unavailable".into()),
            ),
        ];

        for (status, body, expected) in cases {
            let server = StubServer::serve(vec![http_response(status, &[], body.as_bytes())]);
            let client = local_client(&server);

            assert_eq!(client.compress(b"raw-image").unwrap_err(), expected, "{status}");
            assert_eq!(server.requests().len(), 1);
        }
    }

    #[test]
    fn test_failed_output_download_is_classified() {
        let server = StubServer::serve(vec![
            http_response("201 Created", &[("Location", "/output/abc123")], b"{}"),
            http_response("502 Bad Gateway", &[], b""),
        ]);
        let client = local_client(&server);

        let result = client.compress(b"raw-image");

        assert_eq!(result.unwrap_err(), CompressError::Server("no details".into()));
        assert_eq!(server.requests().len(), 2);
    }

    #[test]
    fn test_unreachable_service_is_connection_error() {
        let client = TinifyClient::new("key").unwrap().with_base_url("http://127.0.0.1:1");
        let result = client.compress(b"not really an image");
        assert!(matches!(result, Err(CompressError::Connection(_))));
    }

    // ---- Integration tests (require network, marked #[ignore]) ----

    #[test]
    #[ignore]
    fn test_integration_bad_key_is_account_error() {
        let client = TinifyClient::new("definitely-not-a-valid-key").unwrap();
        let result = client.compress(&[0x89, 0x50, 0x4E, 0x47]);
        assert!(matches!(result, Err(CompressError::Account(_))));
    }
}
