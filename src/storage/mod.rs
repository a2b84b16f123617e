//! Staging directories for request-scoped files.
//!
//! Uploaded videos land in the incoming directory and converted MP3s in the
//! output directory. Nothing here tracks ownership: each request generates its
//! own names and is responsible for deleting what it created, which it does
//! through a [`CleanupGuard`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub mod cleanup;

pub use cleanup::{CleanupGuard, GuardedStream};

/// A freshly generated output location
#[derive(Debug, Clone)]
pub struct OutputTarget {
    /// Where ffmpeg writes the file
    pub path: PathBuf,

    /// `<timestamp>.mp3`, offered to the client as the download name
    pub download_name: String,
}

/// The pair of staging directories
#[derive(Debug, Clone)]
pub struct TempFileStore {
    uploads_dir: PathBuf,
    output_dir: PathBuf,
}

impl TempFileStore {
    pub fn new(uploads_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if they are missing
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.uploads_dir, &self.output_dir] {
            fs_err::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }

        Ok(())
    }

    /// Path for a new upload, keeping the extension of the client's file name
    pub fn upload_path(&self, original_name: Option<&str>) -> PathBuf {
        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        let stem = unique_stem();
        let filename = match extension {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem,
        };

        self.uploads_dir.join(filename)
    }

    /// Fresh output location for a conversion
    pub fn output_target(&self) -> OutputTarget {
        let timestamp = chrono::Utc::now().timestamp_millis();

        // The timestamp alone collides under concurrent requests; the on-disk
        // name carries a random suffix, the download name does not.
        let filename = format!("{}-{}.mp3", timestamp, random_suffix());

        OutputTarget {
            path: self.output_dir.join(filename),
            download_name: format!("{}.mp3", timestamp),
        }
    }
}

/// Remove every existing path, skipping missing ones. Never fails.
pub fn delete<P: AsRef<Path>>(paths: &[P]) {
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            continue;
        }

        match fs_err::remove_file(path) {
            Ok(()) => tracing::debug!("Removed temporary file {}", path.display()),
            Err(e) => tracing::warn!(error = %e, "Failed to remove temporary file"),
        }
    }
}

fn unique_stem() -> String {
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), random_suffix())
}

fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}
