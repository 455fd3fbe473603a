//! Delivery with document fallback.
//!
//! Both video and audio go out the same way: try the native attachment
//! kind first, fall back to a generic document, and only if both raise is
//! the combined failure reported upward.

use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::core::error::{AppError, AppResult};
use crate::download::metadata::probe_media;
use crate::telegram::Bot;

/// Synthesized attachment filename: lowercased platform plus a fixed suffix
fn document_name(platform: &str, suffix: &str) -> String {
    format!("{}_{}", platform.to_lowercase(), suffix)
}

/// Sends a downloaded video as a native streaming attachment.
///
/// The file is probed first so Telegram gets width/height/duration and
/// renders an inline player; a failed probe just omits those fields. If
/// the video send raises, the same bytes go out as a document with
/// content-type detection disabled.
pub async fn send_video_with_fallback(bot: &Bot, chat_id: ChatId, file_path: &str, platform: &str) -> AppResult<()> {
    let probe = probe_media(file_path).await;
    log::debug!("Probe for {}: {:?}", file_path, probe);

    let mut request = bot.send_video(chat_id, InputFile::file(file_path)).supports_streaming(true);
    if let Some(dur) = probe.duration_secs {
        request = request.duration(dur);
    }
    if let Some(w) = probe.width {
        request = request.width(w);
    }
    if let Some(h) = probe.height {
        request = request.height(h);
    }

    let video_err = match request.await {
        Ok(_) => {
            log::info!("Video sent to chat {}", chat_id);
            return Ok(());
        }
        Err(e) => e,
    };

    log::warn!("send_video failed for chat {}: {}, falling back to document", chat_id, video_err);

    let document = InputFile::file(file_path).file_name(document_name(platform, "video.mp4"));
    match bot
        .send_document(chat_id, document)
        .disable_content_type_detection(true)
        .await
    {
        Ok(_) => {
            log::info!("Video sent as document to chat {}", chat_id);
            Ok(())
        }
        Err(doc_err) => {
            log::error!(
                "Document fallback also failed for chat {}: video={}, document={}",
                chat_id,
                video_err,
                doc_err
            );
            Err(AppError::Delivery(format!(
                "video send failed ({}), document fallback failed ({})",
                video_err, doc_err
            )))
        }
    }
}

/// Sends a downloaded audio track, with the same document fallback and
/// combined-failure reporting as video delivery.
pub async fn send_audio_with_fallback(bot: &Bot, chat_id: ChatId, file_path: &str, platform: &str) -> AppResult<()> {
    let audio = InputFile::file(file_path).file_name(document_name(platform, "audio.m4a"));

    let audio_err = match bot.send_audio(chat_id, audio).await {
        Ok(_) => {
            log::info!("Audio sent to chat {}", chat_id);
            return Ok(());
        }
        Err(e) => e,
    };

    log::warn!("send_audio failed for chat {}: {}, falling back to document", chat_id, audio_err);

    let document = InputFile::file(file_path).file_name(document_name(platform, "audio.m4a"));
    match bot
        .send_document(chat_id, document)
        .disable_content_type_detection(true)
        .await
    {
        Ok(_) => {
            log::info!("Audio sent as document to chat {}", chat_id);
            Ok(())
        }
        Err(doc_err) => {
            log::error!(
                "Document fallback also failed for chat {}: audio={}, document={}",
                chat_id,
                audio_err,
                doc_err
            );
            Err(AppError::Delivery(format!(
                "audio send failed ({}), document fallback failed ({})",
                audio_err, doc_err
            )))
        }
    }
}
