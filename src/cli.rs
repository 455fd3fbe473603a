use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "yukla")]
#[command(author, version, about = "Telegram bot for downloading social media videos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Print extractor metadata and derived quality options for a URL
    Info {
        /// Video URL to inspect
        url: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
