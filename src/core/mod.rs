pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod utils;
