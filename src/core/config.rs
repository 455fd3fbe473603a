use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Path to cookies file passed to yt-dlp for authenticated extraction
/// Read from YTDLP_COOKIES environment variable; optional.
/// Supports tilde (~) expansion for home directory.
pub static YTDLP_COOKIES: Lazy<Option<String>> = Lazy::new(|| {
    env::var("YTDLP_COOKIES")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(|s| shellexpand::tilde(&s).into_owned())
});

/// Directory for temporary download artifacts
/// Read from TEMP_DIRECTORY environment variable, defaults to /tmp
pub static TEMP_DIRECTORY: Lazy<String> = Lazy::new(|| {
    env::var("TEMP_DIRECTORY")
        .map(|s| shellexpand::tilde(&s).into_owned())
        .unwrap_or_else(|_| "/tmp".to_string())
});

/// Log file path
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "yukla.log".to_string()));

/// Telegram attachment limits
pub mod telegram {
    /// Maximum file size the standard Bot API accepts from bots (50 MB)
    pub const MAX_FILE_SIZE_MB: u64 = 50;

    /// Same limit in bytes
    pub const MAX_FILE_SIZE_BYTES: u64 = MAX_FILE_SIZE_MB * 1024 * 1024;
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for yt-dlp metadata-only probing (in seconds)
    pub const METADATA_TIMEOUT_SECS: u64 = 120;

    /// Timeout for a full yt-dlp download (in seconds)
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 600;

    /// Bounded wait for ffprobe (in seconds)
    pub const PROBE_TIMEOUT_SECS: u64 = 10;

    /// Maximum number of concurrent downloads across all users
    /// Read from MAX_CONCURRENT_DOWNLOADS environment variable, defaults to 5
    pub fn max_concurrent_downloads() -> usize {
        std::env::var("MAX_CONCURRENT_DOWNLOADS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5)
    }

    /// yt-dlp metadata probe timeout duration
    pub fn metadata_timeout() -> Duration {
        Duration::from_secs(METADATA_TIMEOUT_SECS)
    }

    /// yt-dlp download timeout duration
    pub fn download_timeout() -> Duration {
        Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)
    }

    /// ffprobe timeout duration
    pub fn probe_timeout() -> Duration {
        Duration::from_secs(PROBE_TIMEOUT_SECS)
    }
}

/// Pending-selection store configuration
pub mod selection {
    use super::Duration;

    /// How long a shown quality menu stays clickable (in seconds)
    pub const TTL_SECS: u64 = 1800;

    /// Interval between sweeps of expired entries (in seconds)
    pub const CLEANUP_INTERVAL_SECS: u64 = 300;

    /// Selection time-to-live duration
    pub fn ttl() -> Duration {
        Duration::from_secs(TTL_SECS)
    }

    /// Cleanup sweep interval duration
    pub fn cleanup_interval() -> Duration {
        Duration::from_secs(CLEANUP_INTERVAL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for the bot's HTTP client (in seconds)
    /// Generous because video uploads to the Bot API can take minutes.
    pub const REQUEST_TIMEOUT_SECS: u64 = 900;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Retry configuration for the dispatcher loop
pub mod retry {
    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;
}
