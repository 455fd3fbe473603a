//! Quality resolver: turns the raw extractor format list into a bounded,
//! ranked set of selectable options.
//!
//! The output is 1 to 4 options: one audio entry always first, then up to
//! three video tiers (High, and Medium/Low when enough distinct formats
//! exist). Zero formats in means zero options out; the caller treats that
//! as `NoQualityOptions`.

use crate::core::utils::format_filesize;
use crate::download::metadata::{FormatDescriptor, VideoMetadata};

/// Sentinel format id for the synthesized audio option. Resolved lazily
/// by the downloader as "best available audio, transcoded to m4a".
pub const BEST_AUDIO_FORMAT_ID: &str = "bestaudio";

/// Whether an option downloads an audio track or a video variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityKind {
    Audio,
    Video,
}

/// One selectable row of the quality menu
#[derive(Debug, Clone)]
pub struct QualityOption {
    pub kind: QualityKind,
    pub format_id: String,
    pub label: String,
    /// Size suffix like " - 12.3MB", empty when the size is unknown
    pub size: String,
    pub ext: String,
    pub icon: &'static str,
}

impl QualityOption {
    /// Button caption: `{icon} {label}{size}`
    pub fn button_text(&self) -> String {
        format!("{} {}{}", self.icon, self.label, self.size)
    }
}

fn video_rank(f: &FormatDescriptor) -> f64 {
    f.height.unwrap_or(0) as f64 * f.fps.unwrap_or(30.0)
}

fn height_label(f: &FormatDescriptor) -> String {
    match f.height {
        Some(h) => format!("{}p", h),
        None => "?p".to_string(),
    }
}

fn video_option(label_prefix: &str, f: &FormatDescriptor) -> QualityOption {
    QualityOption {
        kind: QualityKind::Video,
        format_id: f.format_id.clone(),
        label: format!("{} ({})", label_prefix, height_label(f)),
        size: f.size_bytes().map(format_filesize).unwrap_or_default(),
        ext: f.ext.clone().unwrap_or_else(|| "mp4".to_string()),
        icon: "📹",
    }
}

/// Derives the ranked quality options from extractor metadata.
///
/// Audio goes first: the highest-bitrate audio-only format, or a
/// synthesized best-audio placeholder when the extractor reported none.
/// Video tiers come from combined audio+video formats in mp4/webm
/// containers, falling back to video-only formats when no combined ones
/// exist, sorted by `height * fps` descending (stable).
pub fn quality_options(metadata: &VideoMetadata) -> Vec<QualityOption> {
    if metadata.formats.is_empty() {
        return Vec::new();
    }

    let mut options = Vec::new();

    let best_audio = metadata
        .formats
        .iter()
        .filter(|f| f.has_audio() && !f.has_video())
        .max_by(|a, b| {
            a.abr
                .unwrap_or(0.0)
                .total_cmp(&b.abr.unwrap_or(0.0))
        });

    match best_audio {
        Some(audio) => options.push(QualityOption {
            kind: QualityKind::Audio,
            format_id: audio.format_id.clone(),
            label: "Audio Only".to_string(),
            size: audio.size_bytes().map(format_filesize).unwrap_or_default(),
            ext: audio.ext.clone().unwrap_or_else(|| "m4a".to_string()),
            icon: "🎵",
        }),
        None => options.push(QualityOption {
            kind: QualityKind::Audio,
            format_id: BEST_AUDIO_FORMAT_ID.to_string(),
            label: "Audio Only".to_string(),
            size: String::new(),
            ext: "m4a".to_string(),
            icon: "🎵",
        }),
    }

    let container_ok =
        |f: &&FormatDescriptor| matches!(f.ext.as_deref(), Some("mp4") | Some("webm"));

    let mut video_formats: Vec<&FormatDescriptor> = metadata
        .formats
        .iter()
        .filter(|f| f.has_video() && f.has_audio())
        .filter(container_ok)
        .collect();

    // Some extractors only publish split streams; offer the video-only
    // tracks then and let the downloader merge in audio.
    if video_formats.is_empty() {
        video_formats = metadata
            .formats
            .iter()
            .filter(|f| f.has_video() && !f.has_audio())
            .filter(container_ok)
            .collect();
    }

    video_formats.sort_by(|a, b| video_rank(b).total_cmp(&video_rank(a)));

    if let Some(high) = video_formats.first() {
        options.push(video_option("High", high));

        if video_formats.len() >= 3 {
            let medium = video_formats[video_formats.len() / 2];
            options.push(video_option("Medium", medium));
        }

        if video_formats.len() >= 2 {
            let low = video_formats[video_formats.len() - 1];
            options.push(video_option("Low", low));
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_fmt(id: &str, height: Option<u32>, fps: Option<f64>, size: Option<u64>) -> FormatDescriptor {
        serde_json::from_value(serde_json::json!({
            "format_id": id,
            "ext": "mp4",
            "vcodec": "avc1",
            "acodec": "mp4a",
            "height": height,
            "fps": fps,
            "filesize": size,
        }))
        .unwrap()
    }

    fn audio_fmt(id: &str, abr: Option<f64>) -> FormatDescriptor {
        serde_json::from_value(serde_json::json!({
            "format_id": id,
            "ext": "m4a",
            "vcodec": "none",
            "acodec": "mp4a",
            "abr": abr,
        }))
        .unwrap()
    }

    fn meta(formats: Vec<FormatDescriptor>) -> VideoMetadata {
        VideoMetadata {
            title: Some("t".to_string()),
            duration: None,
            formats,
        }
    }

    #[test]
    fn test_empty_formats_yield_no_options() {
        assert!(quality_options(&meta(vec![])).is_empty());
    }

    #[test]
    fn test_full_menu_order_and_ranking() {
        let m = meta(vec![
            audio_fmt("a1", Some(64.0)),
            audio_fmt("a2", Some(128.0)),
            video_fmt("v360", Some(360), Some(30.0), Some(5 << 20)),
            video_fmt("v1080", Some(1080), Some(30.0), Some(40 << 20)),
            video_fmt("v720", Some(720), Some(30.0), Some(20 << 20)),
            video_fmt("v480", Some(480), Some(30.0), None),
        ]);

        let opts = quality_options(&m);
        assert_eq!(opts.len(), 4);

        assert_eq!(opts[0].kind, QualityKind::Audio);
        assert_eq!(opts[0].format_id, "a2");

        assert_eq!(opts[1].label, "High (1080p)");
        assert_eq!(opts[1].format_id, "v1080");
        // 4 video formats, middle index 2 of [1080, 720, 480, 360]
        assert_eq!(opts[2].label, "Medium (480p)");
        assert_eq!(opts[3].label, "Low (360p)");

        // Ranking holds: high >= medium >= low by height
        assert!(opts[1].size.contains("40.0MB"));
        assert_eq!(opts[2].size, "");
    }

    #[test]
    fn test_synthetic_audio_when_no_audio_only_format() {
        let m = meta(vec![video_fmt("v720", Some(720), Some(30.0), None)]);
        let opts = quality_options(&m);
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0].format_id, BEST_AUDIO_FORMAT_ID);
        assert_eq!(opts[0].ext, "m4a");
        assert_eq!(opts[0].size, "");
        assert_eq!(opts[1].label, "High (720p)");
    }

    #[test]
    fn test_single_video_format_omits_medium_and_low() {
        let m = meta(vec![
            audio_fmt("a1", Some(128.0)),
            video_fmt("v1", Some(720), Some(30.0), None),
        ]);
        let opts = quality_options(&m);
        assert_eq!(opts.len(), 2);
    }

    #[test]
    fn test_two_video_formats_omit_medium() {
        let m = meta(vec![
            audio_fmt("a1", None),
            video_fmt("v1", Some(720), Some(30.0), None),
            video_fmt("v2", Some(360), Some(30.0), None),
        ]);
        let opts = quality_options(&m);
        assert_eq!(opts.len(), 3);
        assert_eq!(opts[1].label, "High (720p)");
        assert_eq!(opts[2].label, "Low (360p)");
    }

    #[test]
    fn test_video_only_fallback_when_no_combined_formats() {
        let split: FormatDescriptor = serde_json::from_value(serde_json::json!({
            "format_id": "v-only",
            "ext": "webm",
            "vcodec": "vp9",
            "acodec": "none",
            "height": 1080,
        }))
        .unwrap();
        let m = meta(vec![split]);
        let opts = quality_options(&m);
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[1].format_id, "v-only");
        assert_eq!(opts[1].ext, "webm");
    }

    #[test]
    fn test_container_filter_excludes_exotic_extensions() {
        let flv: FormatDescriptor = serde_json::from_value(serde_json::json!({
            "format_id": "flv1",
            "ext": "flv",
            "vcodec": "h263",
            "acodec": "mp3",
            "height": 480,
        }))
        .unwrap();
        let m = meta(vec![flv]);
        let opts = quality_options(&m);
        // Only the synthetic audio option remains
        assert_eq!(opts.len(), 1);
        assert_eq!(opts[0].kind, QualityKind::Audio);
    }

    #[test]
    fn test_missing_height_renders_question_mark() {
        let m = meta(vec![video_fmt("v?", None, None, None)]);
        let opts = quality_options(&m);
        assert_eq!(opts[1].label, "High (?p)");
    }

    #[test]
    fn test_button_text_shape() {
        let opt = QualityOption {
            kind: QualityKind::Video,
            format_id: "v".to_string(),
            label: "High (720p)".to_string(),
            size: " - 12.3MB".to_string(),
            ext: "mp4".to_string(),
            icon: "📹",
        };
        assert_eq!(opt.button_text(), "📹 High (720p) - 12.3MB");
    }
}
