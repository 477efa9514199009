//! Image downloader
//!
//! Fetches a URL under a retry policy and writes the body to disk.

use crate::error::{PicError, Result};
use crate::network::HttpFetch;
use crate::retry::RetryPolicy;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Downloads remote files with retries
pub struct Downloader<F> {
    fetch: F,
    policy: RetryPolicy,
}

impl<F: HttpFetch> Downloader<F> {
    /// Create a downloader with the default policy (3 attempts, 1s apart)
    pub fn new(fetch: F) -> Self {
        Self::with_policy(fetch, RetryPolicy::default())
    }

    pub fn with_policy(fetch: F, policy: RetryPolicy) -> Self {
        Self { fetch, policy }
    }

    /// Download `url` into `target`, creating or overwriting it
    ///
    /// Returns the number of bytes written. Nothing is written unless an
    /// attempt succeeds. Local write failures are not retried.
    pub fn download(&self, url: &str, target: &Path) -> Result<u64> {
        let data = self
            .policy
            .run(|attempt| {
                debug!(attempt, url, "Requesting image");
                self.fetch.get_bytes(url, &[]).inspect_err(|e| {
                    debug!(attempt, error = %e, "Image request failed");
                })
            })
            .map_err(|(e, attempts)| {
                debug!(url, attempts, error = %e, "Giving up on download");
                PicError::DownloadFailed {
                    url: url.to_string(),
                    attempts,
                }
            })?;

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(target, &data)?;

        Ok(data.len() as u64)
    }
}
