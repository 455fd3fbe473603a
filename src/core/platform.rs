//! Supported-platform detection
//!
//! URLs are matched by substring containment of a known domain token.
//! The table is ordered: the first matching identifier wins, and the
//! order below is the fixed registration order.

/// Mapping from URL domain token to canonical platform display name
pub static PLATFORM_IDENTIFIERS: &[(&str, &str)] = &[
    ("youtube.com", "YouTube"),
    ("youtu.be", "YouTube"),
    ("instagram.com", "Instagram"),
    ("tiktok.com", "TikTok"),
    ("facebook.com", "Facebook"),
    ("fb.com", "Facebook"),
    ("twitter.com", "Twitter"),
    ("x.com", "Twitter"),
    ("pinterest.com", "Pinterest"),
    ("pin.it", "Pinterest"),
    ("reddit.com", "Reddit"),
    ("vimeo.com", "Vimeo"),
];

/// Detects the source platform of a URL by substring match.
///
/// Returns the canonical display name of the first matching identifier,
/// or `None` when no configured token is contained in the URL.
pub fn detect_platform(url: &str) -> Option<&'static str> {
    PLATFORM_IDENTIFIERS
        .iter()
        .find(|(token, _)| url.contains(token))
        .map(|(_, name)| *name)
}

/// Returns the deduplicated list of supported platform names, in
/// registration order. Used for the "unsupported platform" message.
pub fn supported_platforms() -> Vec<&'static str> {
    let mut names = Vec::new();
    for (_, name) in PLATFORM_IDENTIFIERS {
        if !names.contains(name) {
            names.push(*name);
        }
    }
    names
}
