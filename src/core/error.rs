use thiserror::Error;

/// Centralized error types for the application
///
/// All failures in the download pipeline are converted to this enum for
/// consistent handling. External-call boundaries (yt-dlp, ffprobe, Telegram
/// sends) never let raw errors escape a handler; they map to one of these
/// variants and a fixed user-facing message.
#[derive(Error, Debug)]
pub enum AppError {
    /// No configured platform identifier matches the submitted URL
    #[error("Unsupported platform for URL: {0}")]
    UnsupportedPlatform(String),

    /// yt-dlp raised or returned nothing during info-only probing
    #[error("Failed to fetch video metadata: {0}")]
    MetadataFetch(String),

    /// Metadata was returned but yielded zero derivable quality options
    #[error("No quality options available")]
    NoQualityOptions,

    /// Download/yt-dlp errors
    #[error("Download error: {0}")]
    Download(String),

    /// Downloaded artifact exceeds the Telegram attachment ceiling
    #[error("File too large: {size_mb:.1} MB (limit {limit_mb} MB)")]
    SizeExceeded { size_mb: f64, limit_mb: u64 },

    /// Both the native attachment send and the document fallback failed
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
