//! Small shared helpers: file sizing, size labels, user agents

use rand::seq::IndexedRandom;
use std::path::Path;

use crate::core::error::AppResult;

/// Browser user agents rotated per yt-dlp invocation
pub static USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Picks a random user agent from the pool
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Returns the size of a file in bytes
pub fn get_file_size_bytes(path: &Path) -> AppResult<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Returns the size of a file in megabytes
pub fn get_file_size_mb(path: &Path) -> AppResult<f64> {
    Ok(get_file_size_bytes(path)? as f64 / (1024.0 * 1024.0))
}

/// Formats a byte count as a button-label suffix, e.g. " - 12.3MB".
///
/// Unknown or zero sizes produce an empty string so the label carries
/// no size part at all.
pub fn format_filesize(bytes: u64) -> String {
    if bytes == 0 {
        return String::new();
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!(" - {:.1}KB", kb);
    }
    let mb = kb / 1024.0;
    if mb < 1024.0 {
        return format!(" - {:.1}MB", mb);
    }
    format!(" - {:.1}GB", mb / 1024.0)
}

/// True when the path carries an audio container extension
pub fn is_audio_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("m4a") | Some("mp3")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_filesize_kilobytes() {
        assert_eq!(format_filesize(500 * 1024), " - 500.0KB");
    }

    #[test]
    fn test_format_filesize_megabytes() {
        assert_eq!(format_filesize(2 * 1024 * 1024), " - 2.0MB");
    }

    #[test]
    fn test_format_filesize_gigabytes() {
        assert_eq!(format_filesize(2048 * 1024 * 1024), " - 2.0GB");
    }

    #[test]
    fn test_format_filesize_zero_is_empty() {
        assert_eq!(format_filesize(0), "");
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(&PathBuf::from("/tmp/a.m4a")));
        assert!(is_audio_file(&PathBuf::from("/tmp/a.mp3")));
        assert!(!is_audio_file(&PathBuf::from("/tmp/a.mp4")));
        assert!(!is_audio_file(&PathBuf::from("/tmp/noext")));
    }

    #[test]
    fn test_random_user_agent_from_pool() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
    }
}
