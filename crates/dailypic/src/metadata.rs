//! Daily metadata fetcher
//!
//! Looks up the wallpaper published for a date and hands its URL to the
//! downloader. The response is the iciba daily sentence record; only the
//! image URL and the `dateline` identifier matter for naming.

use crate::config::source::{DEFAULT_BASE_URL, IDENTIFIER_FIELD, IMAGE_FIELD};
use crate::date::Date;
use crate::error::{PicError, Result};
use crate::network::{Downloader, HttpFetch};

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// =============================================================================
// Response type (serde)
// =============================================================================

/// The subset of the daily record we care about
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DailyEntry {
    /// Shareable wallpaper URL
    #[serde(default)]
    pub fenxiang_img: Option<String>,

    /// Identifier used as the base filename (string or number upstream)
    #[serde(default, deserialize_with = "string_or_number")]
    pub dateline: Option<String>,

    /// Sentence of the day
    #[serde(default)]
    pub content: Option<String>,

    /// Its translation
    #[serde(default)]
    pub note: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl DailyEntry {
    /// Image URL, if present and non-blank
    pub fn image_url(&self) -> Option<&str> {
        self.fenxiang_img
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// `{dateline}{extension of the image URL}`
    ///
    /// The identifier comes from the remote record and must be a single plain
    /// path component, so the file always lands directly in the output dir.
    pub fn file_name(&self) -> Result<String> {
        let id = self
            .dateline
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(PicError::MissingField(IDENTIFIER_FIELD))?;
        if !is_plain_component(id) {
            return Err(PicError::InvalidIdentifier(id.to_string()));
        }
        let ext = self.image_url().map(url_extension).unwrap_or_default();
        Ok(format!("{id}{ext}"))
    }
}

fn is_plain_component(name: &str) -> bool {
    !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
        && !name.starts_with('.')
        && !Path::new(name).has_root()
        && !name.contains(':')
}

/// Extension (with leading dot) of the last path segment of a URL
///
/// Query strings and fragments are ignored. Dotfiles and extension-less
/// names yield an empty string.
pub fn url_extension(url: &str) -> String {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let segment = path.rsplit('/').next().unwrap_or_default();
    match segment.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < segment.len() => segment[idx..].to_string(),
        _ => String::new(),
    }
}

// =============================================================================
// MetadataFetcher
// =============================================================================

/// Client for the daily metadata endpoint
pub struct MetadataFetcher<F> {
    fetch: F,
    base_url: String,
}

impl<F: HttpFetch> MetadataFetcher<F> {
    /// Create a fetcher for the default endpoint
    pub fn new(fetch: F) -> Self {
        Self::with_base_url(fetch, DEFAULT_BASE_URL)
    }

    /// Create a fetcher for a custom endpoint (mirrors, tests)
    pub fn with_base_url(fetch: F, base_url: impl Into<String>) -> Self {
        Self {
            fetch,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `?file=json&date=<date>` and parse the record
    ///
    /// Not retried.
    pub fn fetch_entry(&self, date: &Date) -> Result<DailyEntry> {
        let date_str = date.to_string();
        let body = self
            .fetch
            .get_bytes(&self.base_url, &[("file", "json"), ("date", &date_str)])?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch the record for `date` and download its image into `output_dir`
    ///
    /// Returns the path of the downloaded file. No download is attempted when
    /// the record has no image URL.
    pub fn fetch_image<D: HttpFetch>(
        &self,
        date: &Date,
        downloader: &Downloader<D>,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let entry = self.fetch_entry(date)?;

        if let Some(content) = entry.content.as_deref() {
            info!(%date, "{}", content);
        }

        let Some(url) = entry.image_url() else {
            debug!(%date, field = IMAGE_FIELD, "Record has no image URL");
            return Err(PicError::NoImage {
                date: date.to_string(),
            });
        };

        let target = output_dir.join(entry.file_name()?);
        let bytes = downloader.download(url, &target)?;
        info!(file = %target.display(), bytes, "Downloaded");

        Ok(target)
    }
}
