pub mod downloader;
pub mod metadata;
pub mod quality;
