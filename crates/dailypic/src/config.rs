//! Configuration constants for dailypic

/// Application metadata
pub mod app {
    /// Application name (used for the user config directory)
    pub const NAME: &str = "dailypic";

    /// Config file looked up in the working directory and the user config dir
    pub const CONFIG_FILE: &str = "config.ini";
}

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("dailypic/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Whole-request timeout in seconds (covers image bodies and uploads)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
}

/// Daily metadata source
pub mod source {
    /// iciba daily sentence API
    pub const DEFAULT_BASE_URL: &str = "https://open.iciba.com/dsapi/";

    /// Response field carrying the shareable wallpaper URL
    pub const IMAGE_FIELD: &str = "fenxiang_img";

    /// Response field used as the base filename
    pub const IDENTIFIER_FIELD: &str = "dateline";
}

/// Download retry defaults
pub mod download {
    /// Attempts before a download is given up
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Pause between attempts in seconds
    pub const RETRY_DELAY_SECS: u64 = 1;

    /// Cap for exponential backoff in seconds
    pub const MAX_BACKOFF_SECS: u64 = 30;
}

/// Tinify compression API
pub mod tinify {
    /// API root
    pub const DEFAULT_BASE_URL: &str = "https://api.tinify.com";

    /// Environment variable consulted when no config file provides a key
    pub const API_KEY_ENV: &str = "TINIFY_API_KEY";

    /// Used when no key is configured anywhere; the API rejects it
    pub const PLACEHOLDER_API_KEY: &str = "here set your API key";

    /// Basic-auth user name expected by the API
    pub const AUTH_USER: &str = "api";

    /// Header reporting the number of compressions used this month
    pub const COMPRESSION_COUNT_HEADER: &str = "Compression-Count";
}
