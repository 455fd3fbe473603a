//! Fixed user-facing texts (deployment locale is Uzbek)

pub const WELCOME: &str = "👋 Assalomu aleykum!\n\n📥 Instagram, TikTok, YouTube va Pinterest'dan video yuklab olishingiz mumkin.\n\n📎 Havola yuboring va videoni oling!\n\n👨‍💻 Murojaat uchun: @imurodl";

pub const ANALYZING: &str = "Tahlil qilinmoqda...";
pub const DOWNLOADING: &str = "Yuklanmoqda...";
pub const CHECKING: &str = "Tekshirilmoqda...";
pub const SENDING: &str = "Yuborilmoqda...";
pub const ERROR: &str = "Xatolik\nBoshqa havola yuboring";

/// Callback alerts
pub const ALERT_FOREIGN_SELECTION: &str = "Bu yuklab olish sizniki emas";
pub const ALERT_EXPIRED_SELECTION: &str = "Yuklab olish muddati tugagan, havolani qaytadan yuboring";
pub const ALERT_PROCESSING: &str = "Ishlanmoqda...";

pub fn success(size_mb: f64) -> String {
    format!("Tayyor! ({:.1}MB)", size_mb)
}

pub fn too_large(size_mb: f64, limit_mb: u64) -> String {
    format!("Juda katta ({:.1}MB)\nLimiti: {}MB", size_mb, limit_mb)
}

pub fn select_quality(platform: &str) -> String {
    format!("📊 Sifatni tanlang:\n\n🔗 {}", platform)
}

pub fn platform_not_supported(platforms: &[&str]) -> String {
    format!(
        "❌ Bu platforma qo'llab-quvvatlanmaydi\n\n✅ Qo'llab-quvvatlanadigan platformalar:\n{}",
        platforms.join(", ")
    )
}
