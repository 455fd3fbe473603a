//! Dispatcher schema and handler dependencies

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use tokio::sync::Semaphore;

use crate::core::config;
use crate::telegram::bot::Command;
use crate::telegram::downloads::{extract_url, handle_quality_callback, process_video_link};
use crate::telegram::messages;
use crate::telegram::selection::SelectionStore;
use crate::telegram::Bot;

/// Error type produced by dispatcher endpoints
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared services passed into every handler
#[derive(Clone)]
pub struct HandlerDeps {
    pub selections: Arc<SelectionStore>,
    pub download_slots: Arc<Semaphore>,
}

impl HandlerDeps {
    pub fn new() -> Self {
        Self {
            selections: Arc::new(SelectionStore::new(config::selection::ttl())),
            download_slots: Arc::new(Semaphore::new(config::download::max_concurrent_downloads())),
        }
    }
}

impl Default for HandlerDeps {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the dispatcher handler tree.
///
/// Same schema in production and in tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Handler for bot commands (/start)
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command {:?} from chat {}", cmd, msg.chat.id);
            match cmd {
                Command::Start => {
                    if let Err(e) = bot.send_message(msg.chat.id, messages::WELCOME).await {
                        log::error!("Failed to send welcome to chat {}: {}", msg.chat.id, e);
                    }
                }
            }
            Ok(())
        },
    ))
}

/// Handler for regular text: links start Flow A, anything else gets the
/// welcome fallback
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default();

                match extract_url(text) {
                    Some(url) => {
                        let url = url.to_string();
                        process_video_link(&bot, &msg, &deps, &url).await;
                    }
                    None => {
                        if let Err(e) = bot.send_message(msg.chat.id, messages::WELCOME).await {
                            log::error!("Failed to send fallback to chat {}: {}", msg.chat.id, e);
                        }
                    }
                }
                Ok(())
            }
        })
}

/// Handler for quality-menu callback queries
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            handle_quality_callback(&bot, &q, &deps).await;
            Ok(())
        }
    })
}
