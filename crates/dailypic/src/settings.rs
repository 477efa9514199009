//! Runtime settings
//!
//! Resolved once at startup and passed to each stage. Sources, in order of
//! precedence for the API key: config file, `TINIFY_API_KEY`, placeholder.
//! The config file is INI:
//!
//! ```ini
//! [tinify]
//! api_key = YOUR_KEY
//!
//! [source]
//! base_url = https://open.iciba.com/dsapi/
//!
//! [download]
//! max_attempts = 3
//! retry_delay_secs = 1
//!
//! [output]
//! dir = .
//! ```

use crate::config::app::{CONFIG_FILE, NAME};
use crate::config::download::{MAX_ATTEMPTS, RETRY_DELAY_SECS};
use crate::config::source::DEFAULT_BASE_URL;
use crate::config::tinify::{API_KEY_ENV, PLACEHOLDER_API_KEY};
use crate::error::{PicError, Result};
use crate::retry::RetryPolicy;

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Config file layout (serde)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    tinify: TinifySection,
    #[serde(default)]
    source: SourceSection,
    #[serde(default)]
    download: DownloadSection,
    #[serde(default)]
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize)]
struct TinifySection {
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SourceSection {
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DownloadSection {
    max_attempts: Option<u32>,
    retry_delay_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputSection {
    dir: Option<PathBuf>,
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let cfg = config::Config::builder()
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Ini)
                .required(true),
        )
        .build()?;
    Ok(cfg.try_deserialize()?)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// =============================================================================
// Settings
// =============================================================================

/// Where the compression API key came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    ConfigFile(PathBuf),
    Environment,
    /// Nothing configured; requests will be rejected by the service
    Placeholder,
}

impl fmt::Display for ApiKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeySource::ConfigFile(path) => write!(f, "config file {}", path.display()),
            ApiKeySource::Environment => write!(f, "environment variable {}", API_KEY_ENV),
            ApiKeySource::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Resolved settings for a run
#[derive(Clone)]
pub struct Settings {
    /// Tinify API key
    pub api_key: String,
    pub api_key_source: ApiKeySource,
    /// Metadata endpoint
    pub base_url: String,
    /// Directory the image is downloaded into
    pub output_dir: PathBuf,
    /// Download retry rule
    pub retry: RetryPolicy,
    /// Config file that was read, if any
    pub config_file: Option<PathBuf>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("api_key_source", &self.api_key_source)
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("retry", &self.retry)
            .field("config_file", &self.config_file)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: PLACEHOLDER_API_KEY.to_string(),
            api_key_source: ApiKeySource::Placeholder,
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("."),
            retry: RetryPolicy::default(),
            config_file: None,
        }
    }
}

impl Settings {
    /// Resolve settings from the usual locations and the process environment
    ///
    /// `explicit` must exist if given. Otherwise `./config.ini` is tried,
    /// then `<user config dir>/dailypic/config.ini`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = locate_config_file(explicit)?;
        Self::resolve(file.as_deref(), std::env::var(API_KEY_ENV).ok())
    }

    /// Resolve settings from an optional config file and environment key
    pub fn resolve(config_file: Option<&Path>, env_key: Option<String>) -> Result<Self> {
        let file = match config_file {
            Some(path) => read_file_config(path)?,
            None => FileConfig::default(),
        };

        let (api_key, api_key_source) = match (non_empty(file.tinify.api_key), non_empty(env_key))
        {
            (Some(key), _) => (
                key,
                // file.tinify.api_key is only ever Some when a file was read
                ApiKeySource::ConfigFile(config_file.map(Path::to_path_buf).unwrap_or_default()),
            ),
            (None, Some(key)) => (key, ApiKeySource::Environment),
            (None, None) => (PLACEHOLDER_API_KEY.to_string(), ApiKeySource::Placeholder),
        };

        let retry = RetryPolicy::fixed(
            file.download.max_attempts.unwrap_or(MAX_ATTEMPTS),
            Duration::from_secs(file.download.retry_delay_secs.unwrap_or(RETRY_DELAY_SECS)),
        );

        Ok(Self {
            api_key,
            api_key_source,
            base_url: non_empty(file.source.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output_dir: file.output.dir.unwrap_or_else(|| PathBuf::from(".")),
            retry,
            config_file: config_file.map(Path::to_path_buf),
        })
    }

    /// Whether a real API key was configured
    pub fn has_api_key(&self) -> bool {
        self.api_key_source != ApiKeySource::Placeholder
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Find the config file to read, if any
pub fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(PicError::NotFound(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join(NAME).join(CONFIG_FILE))
        .filter(|path| path.is_file()))
}
