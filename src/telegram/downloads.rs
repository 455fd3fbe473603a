//! The two download flows.
//!
//! Flow A: a link arrives, the platform is matched, metadata is fetched
//! and a quality menu is shown. Flow B: a quality button fires a callback,
//! the pending URL is consumed and the chosen format is downloaded,
//! size-checked, delivered and cleaned up.

use once_cell::sync::Lazy;
use regex::Regex;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};

use crate::core::config;
use crate::core::error::AppError;
use crate::core::platform::{detect_platform, supported_platforms};
use crate::core::utils::get_file_size_bytes;
use crate::download::downloader::{cleanup_artifact, download, ArtifactKind};
use crate::download::metadata::fetch_video_info;
use crate::download::quality::quality_options;
use crate::telegram::handlers::HandlerDeps;
use crate::telegram::messages;
use crate::telegram::selection::SelectionStore;
use crate::telegram::send::{send_audio_with_fallback, send_video_with_fallback};
use crate::telegram::Bot;

/// First field of every quality-selection callback payload
pub const SELECTION_TAG: &str = "dl";

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid URL regex"));

/// Pulls the first http(s) URL out of a message text
pub fn extract_url(text: &str) -> Option<&str> {
    URL_REGEX.find(text).map(|m| m.as_str())
}

/// Decomposes a callback payload into (platform, format_id, user_id).
///
/// The payload must be exactly 4 colon-separated fields with the fixed
/// selection tag first; anything else is rejected.
pub fn parse_callback_payload(data: &str) -> Option<(&str, &str, u64)> {
    let fields: Vec<&str> = data.split(':').collect();
    if fields.len() != 4 || fields[0] != SELECTION_TAG {
        return None;
    }
    let user_id = fields[3].parse::<u64>().ok()?;
    Some((fields[1], fields[2], user_id))
}

/// Outcome of the quality-callback preconditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackDecision {
    /// All preconditions passed; the pending URL has been consumed
    Proceed {
        platform: String,
        format_id: String,
        url: String,
    },
    /// The clicking user is not the one the menu was built for
    Unauthorized,
    /// No pending selection: never stored, already consumed, or expired
    Expired,
    /// Payload does not have the selection shape; not ours to handle
    Ignore,
}

/// Runs the callback preconditions in order: payload shape, clicking user
/// matches the embedded requester, pending selection still present.
///
/// Only a full pass consumes the stored entry; a foreign click leaves it
/// in place for the real owner.
pub async fn decide_callback(
    data: Option<&str>,
    clicker_id: u64,
    selections: &SelectionStore,
) -> CallbackDecision {
    let (platform, format_id, owner_id) = match data.and_then(parse_callback_payload) {
        Some(p) => p,
        None => return CallbackDecision::Ignore,
    };

    if clicker_id != owner_id {
        return CallbackDecision::Unauthorized;
    }

    match selections.take(owner_id).await {
        Some(url) => CallbackDecision::Proceed {
            platform: platform.to_string(),
            format_id: format_id.to_string(),
            url,
        },
        None => CallbackDecision::Expired,
    }
}

/// Edits a previously sent progress message, logging edit failures
async fn edit_status(bot: &Bot, chat_id: ChatId, message_id: MessageId, text: &str) {
    if let Err(e) = bot.edit_message_text(chat_id, message_id, text).await {
        log::warn!("Failed to edit status message in chat {}: {}", chat_id, e);
    }
}

/// Flow A: link submission up to the quality menu.
///
/// Every failure ends the flow with a user-visible error message; nothing
/// is retried automatically.
pub async fn process_video_link(bot: &Bot, msg: &Message, deps: &HandlerDeps, url: &str) {
    let user_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);
    let chat_id = msg.chat.id;

    let platform = match detect_platform(url) {
        Some(p) => p,
        None => {
            log::info!("User {}: {}", user_id, AppError::UnsupportedPlatform(url.to_string()));
            let _ = bot
                .send_message(chat_id, messages::platform_not_supported(&supported_platforms()))
                .await;
            return;
        }
    };

    log::info!("Processing {} link from user {}", platform, user_id);

    let progress = match bot.send_message(chat_id, messages::ANALYZING).await {
        Ok(m) => m,
        Err(e) => {
            log::error!("Failed to send progress message to chat {}: {}", chat_id, e);
            return;
        }
    };

    let metadata = match fetch_video_info(url).await {
        Ok(m) => m,
        Err(e) => {
            log::error!("Metadata fetch failed for {}: {}", url, e);
            edit_status(bot, chat_id, progress.id, messages::ERROR).await;
            return;
        }
    };

    let options = quality_options(&metadata);
    if options.is_empty() {
        log::warn!("Resolver failed for {}: {}", url, AppError::NoQualityOptions);
        edit_status(bot, chat_id, progress.id, messages::ERROR).await;
        return;
    }

    deps.selections.insert(user_id, url.to_string()).await;

    let rows: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .map(|opt| {
            vec![InlineKeyboardButton::callback(
                opt.button_text(),
                format!("{}:{}:{}:{}", SELECTION_TAG, platform, opt.format_id, user_id),
            )]
        })
        .collect();

    let edit = bot
        .edit_message_text(chat_id, progress.id, messages::select_quality(platform))
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await;
    if let Err(e) = edit {
        log::error!("Failed to show quality menu in chat {}: {}", chat_id, e);
    }
}

/// Flow B: quality-button callback.
///
/// The chat and message are resolved before anything touches the pending
/// store, so a callback carrying an inaccessible message does not consume
/// the selection. The precondition decision itself lives in
/// `decide_callback`.
pub async fn handle_quality_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) {
    let (chat_id, message_id) = match q.message.as_ref() {
        Some(m) => (m.chat().id, m.id()),
        None => {
            log::warn!("Callback without an accessible message from user {}", q.from.id);
            let _ = bot.answer_callback_query(q.id.clone()).await;
            return;
        }
    };

    let decision = decide_callback(q.data.as_deref(), q.from.id.0, &deps.selections).await;

    let (platform, format_id, url) = match decision {
        CallbackDecision::Proceed {
            platform,
            format_id,
            url,
        } => (platform, format_id, url),
        CallbackDecision::Unauthorized => {
            let _ = bot
                .answer_callback_query(q.id.clone())
                .text(messages::ALERT_FOREIGN_SELECTION)
                .show_alert(true)
                .await;
            return;
        }
        CallbackDecision::Expired => {
            let _ = bot
                .answer_callback_query(q.id.clone())
                .text(messages::ALERT_EXPIRED_SELECTION)
                .show_alert(true)
                .await;
            return;
        }
        CallbackDecision::Ignore => {
            log::warn!("Malformed callback payload: {:?}", q.data);
            let _ = bot.answer_callback_query(q.id.clone()).await;
            return;
        }
    };

    let _ = bot
        .answer_callback_query(q.id.clone())
        .text(messages::ALERT_PROCESSING)
        .await;

    edit_status(bot, chat_id, message_id, messages::DOWNLOADING).await;

    let _permit = match deps.download_slots.acquire().await {
        Ok(p) => p,
        Err(e) => {
            log::error!("Download semaphore closed: {}", e);
            edit_status(bot, chat_id, message_id, messages::ERROR).await;
            return;
        }
    };

    download_and_deliver(bot, chat_id, message_id, &url, &platform, q.from.id.0, Some(&format_id), deps).await;
}

/// Shared tail of both flows: download, size check, delivery, cleanup.
///
/// The artifact is removed from disk on every exit path once the download
/// produced one.
pub async fn download_and_deliver(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    url: &str,
    platform: &str,
    user_id: u64,
    format_id: Option<&str>,
    _deps: &HandlerDeps,
) {
    let artifact = match download(url, platform, user_id, format_id).await {
        Ok(a) => a,
        Err(e) => {
            log::error!("Download failed for {} (user {}): {}", url, user_id, e);
            edit_status(bot, chat_id, message_id, messages::ERROR).await;
            return;
        }
    };

    edit_status(bot, chat_id, message_id, messages::CHECKING).await;

    let outcome = deliver_checked(bot, chat_id, message_id, &artifact.path_str(), platform, artifact.kind).await;

    cleanup_artifact(&artifact.path);

    match outcome {
        Ok(()) => {}
        Err(AppError::SizeExceeded { size_mb, limit_mb }) => {
            edit_status(bot, chat_id, message_id, &messages::too_large(size_mb, limit_mb)).await;
        }
        Err(e) => {
            log::error!("Delivery pipeline failed for user {}: {}", user_id, e);
            edit_status(bot, chat_id, message_id, messages::ERROR).await;
        }
    }
}

/// Size check and send; the caller owns cleanup and renders failures
async fn deliver_checked(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    file_path: &str,
    platform: &str,
    kind: ArtifactKind,
) -> Result<(), AppError> {
    let size_bytes = get_file_size_bytes(std::path::Path::new(file_path))?;
    let size_mb = size_bytes as f64 / (1024.0 * 1024.0);

    if size_bytes > config::telegram::MAX_FILE_SIZE_BYTES {
        log::warn!(
            "Artifact {} is {:.1}MB, over the {}MB ceiling",
            file_path,
            size_mb,
            config::telegram::MAX_FILE_SIZE_MB
        );
        return Err(AppError::SizeExceeded {
            size_mb,
            limit_mb: config::telegram::MAX_FILE_SIZE_MB,
        });
    }

    edit_status(bot, chat_id, message_id, messages::SENDING).await;

    let send_result = match kind {
        ArtifactKind::Video => send_video_with_fallback(bot, chat_id, file_path, platform).await,
        ArtifactKind::Audio => send_audio_with_fallback(bot, chat_id, file_path, platform).await,
    };

    send_result?;

    edit_status(bot, chat_id, message_id, &messages::success(size_mb)).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_url_finds_first_link() {
        assert_eq!(
            extract_url("check this https://youtu.be/X out"),
            Some("https://youtu.be/X")
        );
        assert_eq!(extract_url("http://x.com/a http://y.com/b"), Some("http://x.com/a"));
        assert_eq!(extract_url("no links here"), None);
    }

    #[test]
    fn test_parse_callback_payload_accepts_exact_shape() {
        assert_eq!(
            parse_callback_payload("dl:YouTube:137:42"),
            Some(("YouTube", "137", 42))
        );
        assert_eq!(
            parse_callback_payload("dl:TikTok:bestaudio:900"),
            Some(("TikTok", "bestaudio", 900))
        );
    }

    #[test]
    fn test_parse_callback_payload_rejects_bad_shapes() {
        // Wrong tag
        assert_eq!(parse_callback_payload("xx:YouTube:137:42"), None);
        // Too few fields
        assert_eq!(parse_callback_payload("dl:YouTube:137"), None);
        // Too many fields
        assert_eq!(parse_callback_payload("dl:YouTube:137:42:extra"), None);
        // Non-numeric user id
        assert_eq!(parse_callback_payload("dl:YouTube:137:abc"), None);
        // Empty string
        assert_eq!(parse_callback_payload(""), None);
    }

    fn store() -> SelectionStore {
        SelectionStore::new(std::time::Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_foreign_click_never_consumes_the_selection() {
        let selections = store();
        selections.insert(42, "https://youtu.be/X".to_string()).await;

        let decision = decide_callback(Some("dl:YouTube:137:42"), 99, &selections).await;
        assert_eq!(decision, CallbackDecision::Unauthorized);

        // The entry survives for the real owner
        let decision = decide_callback(Some("dl:YouTube:137:42"), 42, &selections).await;
        assert_eq!(
            decision,
            CallbackDecision::Proceed {
                platform: "YouTube".to_string(),
                format_id: "137".to_string(),
                url: "https://youtu.be/X".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_selection_is_expired() {
        let selections = store();

        let decision = decide_callback(Some("dl:TikTok:0:7"), 7, &selections).await;
        assert_eq!(decision, CallbackDecision::Expired);
    }

    #[tokio::test]
    async fn test_proceed_is_single_use() {
        let selections = store();
        selections.insert(7, "https://tiktok.com/v/1".to_string()).await;

        let first = decide_callback(Some("dl:TikTok:0:7"), 7, &selections).await;
        assert!(matches!(first, CallbackDecision::Proceed { .. }));

        let second = decide_callback(Some("dl:TikTok:0:7"), 7, &selections).await;
        assert_eq!(second, CallbackDecision::Expired);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_ignored() {
        let selections = store();
        selections.insert(42, "https://youtu.be/X".to_string()).await;

        assert_eq!(decide_callback(None, 42, &selections).await, CallbackDecision::Ignore);
        assert_eq!(
            decide_callback(Some("xx:YouTube:137:42"), 42, &selections).await,
            CallbackDecision::Ignore
        );

        // Neither attempt touched the stored entry
        assert_eq!(selections.take(42).await.as_deref(), Some("https://youtu.be/X"));
    }
}
