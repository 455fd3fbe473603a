//! Media metadata extraction via yt-dlp and ffprobe.
//!
//! Two probes live here:
//!
//! - `fetch_video_info` runs an info-only yt-dlp pass (`--dump-json`) and
//!   deserializes the format list used by the quality resolver
//! - `probe_media` asks ffprobe for dimensions and duration of a finished
//!   download so Telegram renders an inline player instead of a file blob

use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::utils::random_user_agent;

/// One entry of the extractor's format list, as emitted by `--dump-json`
#[derive(Debug, Clone, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<u64>,
}

impl FormatDescriptor {
    /// Known size of this format, preferring the exact value over the
    /// extractor's estimate. `None` when neither is reported.
    pub fn size_bytes(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// True when the descriptor carries a real video codec
    pub fn has_video(&self) -> bool {
        matches!(self.vcodec.as_deref(), Some(v) if v != "none")
    }

    /// True when the descriptor carries a real audio codec
    pub fn has_audio(&self) -> bool {
        matches!(self.acodec.as_deref(), Some(a) if a != "none")
    }
}

/// Metadata returned by the info-only extractor pass
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
}

/// Fetches metadata for a URL without downloading anything.
///
/// Runs yt-dlp with `--dump-json` under a bounded timeout. Any failure
/// of the subprocess (spawn error, non-zero exit, timeout, unparseable
/// output) maps to `AppError::MetadataFetch`.
pub async fn fetch_video_info(url: &str) -> AppResult<VideoMetadata> {
    let ytdl_bin = &*config::YTDL_BIN;
    let user_agent = random_user_agent();

    let mut args: Vec<&str> = vec![
        "--dump-json",
        "--no-playlist",
        "--no-warnings",
        "--user-agent",
        user_agent,
    ];

    if let Some(ref cookies) = *config::YTDLP_COOKIES {
        args.push("--cookies");
        args.push(cookies);
    }

    args.push(url);

    log::debug!("yt-dlp metadata command: {} {}", ytdl_bin, args.join(" "));

    let output = timeout(
        config::download::metadata_timeout(),
        TokioCommand::new(ytdl_bin).args(&args).output(),
    )
    .await
    .map_err(|_| {
        log::error!(
            "yt-dlp metadata probe timed out after {}s for {}",
            config::download::METADATA_TIMEOUT_SECS,
            url
        );
        AppError::MetadataFetch("yt-dlp timed out".to_string())
    })?
    .map_err(|e| {
        log::error!("Failed to spawn {}: {}", ytdl_bin, e);
        AppError::MetadataFetch(format!("Failed to spawn yt-dlp: {}", e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::error!("yt-dlp metadata probe failed for {}: {}", url, stderr.trim());
        return Err(AppError::MetadataFetch(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    // With --no-playlist the output is a single JSON object, but some
    // extractors still emit one object per line. Parse the first line
    // that deserializes.
    let metadata = stdout
        .lines()
        .find_map(|line| serde_json::from_str::<VideoMetadata>(line).ok())
        .ok_or_else(|| {
            log::error!("yt-dlp returned no parseable metadata for {}", url);
            AppError::MetadataFetch("empty or unparseable yt-dlp output".to_string())
        })?;

    log::info!(
        "Fetched metadata for {}: title='{}', {} formats",
        url,
        metadata.title.as_deref().unwrap_or("?"),
        metadata.formats.len()
    );

    Ok(metadata)
}

/// Dimensions and duration of a downloaded media file
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaProbe {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_secs: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    duration: Option<String>,
}

/// Probes a finished download with ffprobe.
///
/// Best effort: any failure (missing binary, timeout, unparseable JSON)
/// yields an empty probe and the send proceeds without dimensions.
pub async fn probe_media(path: &str) -> MediaProbe {
    let result = timeout(
        config::download::probe_timeout(),
        TokioCommand::new("ffprobe")
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-show_entries",
                "format=duration",
                "-of",
                "json",
                path,
            ])
            .output(),
    )
    .await;

    let output = match result {
        Ok(Ok(out)) if out.status.success() => out,
        Ok(Ok(out)) => {
            log::warn!(
                "ffprobe failed for {}: {}",
                path,
                String::from_utf8_lossy(&out.stderr).trim()
            );
            return MediaProbe::default();
        }
        Ok(Err(e)) => {
            log::warn!("Failed to spawn ffprobe for {}: {}", path, e);
            return MediaProbe::default();
        }
        Err(_) => {
            log::warn!(
                "ffprobe timed out after {}s for {}",
                config::download::PROBE_TIMEOUT_SECS,
                path
            );
            return MediaProbe::default();
        }
    };

    let parsed: FfprobeOutput = match serde_json::from_slice(&output.stdout) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Unparseable ffprobe output for {}: {}", path, e);
            return MediaProbe::default();
        }
    };

    let (width, height) = parsed
        .streams
        .first()
        .map(|s| (s.width, s.height))
        .unwrap_or((None, None));

    let duration_secs = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .map(|d| d.round() as u32);

    MediaProbe {
        width,
        height,
        duration_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_descriptor_size_prefers_exact() {
        let fmt: FormatDescriptor = serde_json::from_str(
            r#"{"format_id":"22","filesize":100,"filesize_approx":200}"#,
        )
        .unwrap();
        assert_eq!(fmt.size_bytes(), Some(100));

        let fmt: FormatDescriptor =
            serde_json::from_str(r#"{"format_id":"22","filesize_approx":200}"#).unwrap();
        assert_eq!(fmt.size_bytes(), Some(200));

        let fmt: FormatDescriptor = serde_json::from_str(r#"{"format_id":"22"}"#).unwrap();
        assert_eq!(fmt.size_bytes(), None);
    }

    #[test]
    fn test_format_descriptor_stream_flags() {
        let fmt: FormatDescriptor = serde_json::from_str(
            r#"{"format_id":"18","vcodec":"avc1.42001E","acodec":"mp4a.40.2"}"#,
        )
        .unwrap();
        assert!(fmt.has_video());
        assert!(fmt.has_audio());

        let fmt: FormatDescriptor =
            serde_json::from_str(r#"{"format_id":"140","vcodec":"none","acodec":"mp4a.40.2"}"#)
                .unwrap();
        assert!(!fmt.has_video());
        assert!(fmt.has_audio());

        let fmt: FormatDescriptor = serde_json::from_str(r#"{"format_id":"x"}"#).unwrap();
        assert!(!fmt.has_video());
        assert!(!fmt.has_audio());
    }

    #[test]
    fn test_video_metadata_tolerates_missing_fields() {
        let meta: VideoMetadata = serde_json::from_str(r#"{"formats":[]}"#).unwrap();
        assert!(meta.title.is_none());
        assert!(meta.formats.is_empty());
    }
}
