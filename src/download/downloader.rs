//! yt-dlp download invocation and temp-artifact management.
//!
//! Downloads land in the configured temp directory under a unique name:
//! `{platform_lowercased}_{user_id}_{8-char-token}.{ext}`. yt-dlp decides
//! the real extension, so after the process exits we probe a fixed list of
//! container extensions until one exists on disk.

use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use uuid::Uuid;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::utils::{is_audio_file, random_user_agent};
use crate::download::quality::BEST_AUDIO_FORMAT_ID;

/// Container extensions probed after yt-dlp exits, in order
const PROBE_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv", "avi", "mov", "m4a", "mp3"];

/// What kind of attachment a finished download should become.
/// Decided once, when the artifact is located on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Video,
    Audio,
}

/// A finished download on disk
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Builds the yt-dlp argument list for one download.
///
/// Three shapes: the `bestaudio` sentinel extracts and transcodes audio
/// to m4a; an explicit format id is passed verbatim with mp4 preferred as
/// the merge container; no format id falls back to the legacy best-first
/// selector chain.
fn build_download_args<'a>(
    url: &'a str,
    output_template: &'a str,
    format_id: Option<&'a str>,
    user_agent: &'a str,
) -> Vec<&'a str> {
    let mut args = vec![
        url,
        "-o",
        output_template,
        "--no-playlist",
        "--no-warnings",
        "--user-agent",
        user_agent,
    ];

    if let Some(ref cookies) = *config::YTDLP_COOKIES {
        args.push("--cookies");
        args.push(cookies);
    }

    match format_id {
        Some(BEST_AUDIO_FORMAT_ID) => {
            args.extend_from_slice(&[
                "-f",
                "bestaudio[ext=m4a]/bestaudio",
                "-x",
                "--audio-format",
                "m4a",
            ]);
        }
        Some(fmt) => {
            args.extend_from_slice(&["-f", fmt, "--merge-output-format", "mp4"]);
        }
        None => {
            args.extend_from_slice(&["-f", "best[ext=mp4]/best/worst"]);
        }
    }

    args
}

/// Locates the file yt-dlp actually produced for an output template.
///
/// The template ends in `.%(ext)s`; each known extension is tried in turn
/// and the first existing path wins.
pub fn find_downloaded_file(output_template: &str) -> Option<PathBuf> {
    let base = output_template.trim_end_matches(".%(ext)s");
    for ext in PROBE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{}", base, ext));
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Removes a downloaded artifact from disk if it exists.
///
/// Failures are logged and swallowed; cleanup must never turn a
/// successful delivery into an error.
pub fn cleanup_artifact(path: &Path) {
    if path.exists() {
        match std::fs::remove_file(path) {
            Ok(()) => log::debug!("Cleaned up artifact: {}", path.display()),
            Err(e) => log::warn!("Failed to clean up {}: {}", path.display(), e),
        }
    }
}

/// Downloads a URL to the temp directory and returns the resulting artifact.
///
/// The whole yt-dlp run is bounded by the download timeout. Every failure
/// mode (spawn error, non-zero exit, timeout, no discoverable output file)
/// maps to `AppError::Download`.
pub async fn download(
    url: &str,
    platform: &str,
    user_id: u64,
    format_id: Option<&str>,
) -> AppResult<Artifact> {
    let token: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    let output_template = format!(
        "{}/{}_{}_{}.%(ext)s",
        &*config::TEMP_DIRECTORY,
        platform.to_lowercase(),
        user_id,
        token
    );

    let user_agent = random_user_agent();
    let args = build_download_args(url, &output_template, format_id, user_agent);

    log::info!(
        "Downloading {} for user {} (format: {})",
        url,
        user_id,
        format_id.unwrap_or("best")
    );
    log::debug!("yt-dlp download command: {} {}", &*config::YTDL_BIN, args.join(" "));

    let run = async {
        let output = timeout(
            config::download::download_timeout(),
            TokioCommand::new(&*config::YTDL_BIN).args(&args).output(),
        )
        .await
        .map_err(|_| {
            log::error!(
                "yt-dlp download timed out after {}s for {}",
                config::download::DOWNLOAD_TIMEOUT_SECS,
                url
            );
            AppError::Download("yt-dlp timed out".to_string())
        })?
        .map_err(|e| {
            log::error!("Failed to spawn {}: {}", &*config::YTDL_BIN, e);
            AppError::Download(format!("Failed to spawn yt-dlp: {}", e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("yt-dlp download failed for {}: {}", url, stderr.trim());
            return Err(AppError::Download(stderr.trim().to_string()));
        }

        let path = find_downloaded_file(&output_template).ok_or_else(|| {
            log::error!("Downloaded file not found for template {}", output_template);
            AppError::Download("downloaded file not found".to_string())
        })?;

        let kind = if format_id == Some(BEST_AUDIO_FORMAT_ID) || is_audio_file(&path) {
            ArtifactKind::Audio
        } else {
            ArtifactKind::Video
        };

        log::info!("Downloaded {} as {}", url, path.display());
        Ok(Artifact { path, kind })
    };

    let result = run.await;

    // Strip any partial output a failed run left behind
    if result.is_err() {
        if let Some(partial) = find_downloaded_file(&output_template) {
            cleanup_artifact(&partial);
        }
    }

    result
}
