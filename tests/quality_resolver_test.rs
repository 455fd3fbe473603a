//! End-to-end resolver test over a realistic extractor format dump

use pretty_assertions::assert_eq;

use yukla::download::metadata::VideoMetadata;
use yukla::download::quality::{quality_options, QualityKind};

// Trimmed yt-dlp --dump-json output: split audio/video tracks, combined
// progressive formats, and a storyboard entry without codecs.
const EXTRACTOR_DUMP: &str = r#"{
    "title": "Test clip",
    "duration": 213.4,
    "formats": [
        {"format_id": "sb0", "ext": "mhtml"},
        {"format_id": "139", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.5", "abr": 48.0, "filesize": 1306000},
        {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.5, "filesize": 3459000},
        {"format_id": "18", "ext": "mp4", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "height": 360, "fps": 30, "filesize": 9200000},
        {"format_id": "22", "ext": "mp4", "vcodec": "avc1.64001F", "acodec": "mp4a.40.2", "height": 720, "fps": 30, "filesize_approx": 28400000},
        {"format_id": "vp9hd", "ext": "webm", "vcodec": "vp9", "acodec": "opus", "height": 1080, "fps": 60, "filesize": 52100000},
        {"format_id": "3gp", "ext": "3gp", "vcodec": "mp4v", "acodec": "mp4a", "height": 144, "fps": 15}
    ]
}"#;

#[test]
fn resolver_builds_full_menu_from_extractor_dump() {
    let metadata: VideoMetadata = serde_json::from_str(EXTRACTOR_DUMP).expect("dump parses");
    let options = quality_options(&metadata);

    assert_eq!(options.len(), 4);

    // Audio first: highest bitrate audio-only track
    assert_eq!(options[0].kind, QualityKind::Audio);
    assert_eq!(options[0].format_id, "140");
    assert_eq!(options[0].button_text(), "🎵 Audio Only - 3.3MB");

    // Video tiers by height*fps, 3gp container filtered out:
    // [vp9hd (1080x60), 22 (720x30), 18 (360x30)]
    assert_eq!(options[1].format_id, "vp9hd");
    assert_eq!(options[1].label, "High (1080p)");

    assert_eq!(options[2].format_id, "22");
    assert_eq!(options[2].label, "Medium (720p)");
    // Approximate size still yields a label
    assert_eq!(options[2].size, " - 27.1MB");

    assert_eq!(options[3].format_id, "18");
    assert_eq!(options[3].label, "Low (360p)");

    // Heights are non-increasing across the video tiers
    let heights: Vec<&str> = options[1..]
        .iter()
        .map(|o| o.label.split('(').nth(1).unwrap())
        .collect();
    assert_eq!(heights, vec!["1080p)", "720p)", "360p)"]);
}

#[test]
fn resolver_reports_nothing_for_empty_dump() {
    let metadata: VideoMetadata = serde_json::from_str(r#"{"title": "x", "formats": []}"#).unwrap();
    assert!(quality_options(&metadata).is_empty());
}
