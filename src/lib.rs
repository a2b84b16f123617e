//! video2mp3 - a small HTTP service that turns videos into MP3 audio
//!
//! Videos arrive either as multipart uploads or as web-video URLs. Uploads are
//! staged on disk, URLs are resolved into a byte stream with yt-dlp (or fetched
//! directly when they already point at a media file), and ffmpeg produces the
//! MP3 that is streamed back to the caller. Every file a request creates is
//! removed before the request is finished.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod resolver;
pub mod server;
pub mod storage;
pub mod transcoder;
pub mod upload;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use resolver::{RemoteSource, StreamResolver};
pub use server::{build_router, AppState};
pub use storage::TempFileStore;
pub use transcoder::{MediaInput, Transcoder};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
