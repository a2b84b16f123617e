//! Shared application state

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::{Config, LimitsConfig};
use crate::resolver::{ResolverRegistry, StreamResolver};
use crate::storage::TempFileStore;
use crate::transcoder::{FfmpegTranscoder, Transcoder};

/// Shared state across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Staging directories
    pub store: TempFileStore,

    /// MP3 converter
    pub transcoder: Arc<dyn Transcoder>,

    /// URL resolver
    pub resolver: Arc<dyn StreamResolver>,

    /// Bounds the number of conversions running at once
    pub jobs: Arc<Semaphore>,

    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: TempFileStore,
        transcoder: Arc<dyn Transcoder>,
        resolver: Arc<dyn StreamResolver>,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self {
            store,
            transcoder,
            resolver,
            jobs: Arc::new(Semaphore::new(max_concurrent_jobs)),
            max_upload_bytes: LimitsConfig::default().max_upload_bytes,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// State wired to ffmpeg and yt-dlp as configured
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let store = TempFileStore::new(config.uploads_dir()?, config.output_dir()?);

        Ok(Self::new(
            store,
            Arc::new(FfmpegTranscoder::new(config.tools.ffmpeg_path.clone())),
            Arc::new(ResolverRegistry::new(config.tools.yt_dlp_path.clone())),
            config.limits.max_concurrent_jobs,
        )
        .with_max_upload_bytes(config.limits.max_upload_bytes))
    }
}
