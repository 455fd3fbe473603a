pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;
