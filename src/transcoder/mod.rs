//! MP3 conversion through an external ffmpeg process.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::process::Command;

/// A readable byte stream handed to ffmpeg on stdin
pub type MediaStream = Box<dyn AsyncRead + Send + Unpin>;

/// What ffmpeg reads from
pub enum MediaInput {
    /// A file on disk
    File(PathBuf),

    /// A live stream, piped into ffmpeg's stdin
    Stream(MediaStream),
}

impl std::fmt::Debug for MediaInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaInput::File(path) => f.debug_tuple("File").field(path).finish(),
            MediaInput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("Failed to start ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with {status}: {stderr}")]
    Process { status: ExitStatus, stderr: String },

    #[error("Failed to feed input to ffmpeg: {0}")]
    Input(#[source] std::io::Error),
}

/// Converts media into an MP3 file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Write `input` as MP3 to `output`. Resolves once the file is complete.
    async fn convert(&self, input: MediaInput, output: &Path) -> Result<(), TranscodeError>;
}

/// [`Transcoder`] backed by the ffmpeg executable
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Arguments for one conversion; `input` is a path or `pipe:0`
    fn build_args(input: &str, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec!["-hide_banner".into(), "-y".into(), "-i".into(), input.into()];

        args.extend(
            [
                "-vn", // No video
                "-acodec", "mp3",
                "-ab", "128k",
                "-ar", "44100",
                "-f", "mp3",
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        args.push(output.to_string_lossy().into_owned());
        args
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn convert(&self, input: MediaInput, output: &Path) -> Result<(), TranscodeError> {
        let (input_arg, stream) = match input {
            MediaInput::File(path) => (path.to_string_lossy().into_owned(), None),
            MediaInput::Stream(stream) => ("pipe:0".to_string(), Some(stream)),
        };

        tracing::debug!("Converting {} to MP3 at {}", input_arg, output.display());

        let mut child = Command::new(&self.ffmpeg_path)
            .args(Self::build_args(&input_arg, output))
            .stdin(if stream.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(TranscodeError::Spawn)?;

        let stdin = child.stdin.take();

        let feed = async move {
            match (stream, stdin) {
                (Some(mut reader), Some(mut stdin)) => {
                    let copied = tokio::io::copy(&mut reader, &mut stdin).await;
                    // Closing stdin signals end of input
                    drop(stdin);
                    copied.map(|bytes| tracing::debug!(bytes, "Input stream fed to ffmpeg"))
                }
                _ => Ok(()),
            }
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(TranscodeError::Spawn)?;

        // A broken pipe only means ffmpeg stopped reading; its own exit says why
        match fed {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(TranscodeError::Input(e));
            }
            fed => {
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    return Err(TranscodeError::Process {
                        status: output.status,
                        stderr,
                    });
                }
                fed.map_err(TranscodeError::Input)?;
            }
        }

        Ok(())
    }
}
