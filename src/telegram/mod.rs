pub mod bot;
pub mod downloads;
pub mod handlers;
pub mod messages;
pub mod selection;
pub mod send;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};

/// The bot type used throughout the crate
pub type Bot = teloxide::Bot;
