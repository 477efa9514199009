//! Shared HTTP client wrapper
//!
//! Thin wrapper around `reqwest::blocking::Client` that centralizes
//! USER_AGENT and timeout configuration.

use crate::config::network::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS, USER_AGENT};
use crate::error::{PicError, Result};
use std::time::Duration;

/// Plain GET access to remote resources
///
/// Implemented by [`HttpClient`]; tests substitute scripted fetchers.
pub trait HttpFetch {
    /// GET a URL with optional query parameters and return the body
    ///
    /// Non-2xx responses are errors.
    fn get_bytes(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>>;
}

impl<T: HttpFetch + ?Sized> HttpFetch for &T {
    fn get_bytes(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        (**self).get_bytes(url, query)
    }
}

/// Shared HTTP client with standard configuration
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a new client with default dailypic settings
    pub fn new() -> Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { inner })
    }

    /// Access the underlying reqwest client
    pub fn inner(&self) -> &reqwest::blocking::Client {
        &self.inner
    }
}

impl HttpFetch for HttpClient {
    fn get_bytes(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut request = self.inner.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let resp = request.send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PicError::Http {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        Ok(resp.bytes()?.to_vec())
    }
}
