use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};
use std::future::Future;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;

use super::{MediaSource, RemoteSource};
use crate::Result;

/// Video page resolver using yt-dlp
pub struct YtDlpSource {
    yt_dlp_path: String,
}

impl YtDlpSource {
    pub fn new(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
        }
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", "--no-warnings", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run yt-dlp ({})", self.yt_dlp_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        let info: Value = serde_json::from_slice(&output.stdout)
            .context("yt-dlp returned invalid metadata")?;

        Ok(info)
    }

    /// Start yt-dlp writing the best audio (or audio+video) stream to stdout
    fn open_stream(&self, url: &str) -> Result<ProcessStream> {
        let mut child = Command::new(&self.yt_dlp_path)
            .args([
                "--format", "bestaudio/best",
                "--no-playlist",
                "--quiet",
                "--no-warnings",
                "--output", "-",
                url,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to run yt-dlp ({})", self.yt_dlp_path))?;

        let stdout = child
            .stdout
            .take()
            .context("yt-dlp stdout was not captured")?;
        let stderr = child.stderr.take();

        Ok(ProcessStream {
            stdout,
            exit: Some(tokio::spawn(wait_for_exit(child, stderr))),
        })
    }
}

#[async_trait]
impl MediaSource for YtDlpSource {
    async fn open(&self, url: &str) -> Result<RemoteSource> {
        let info = self.get_video_info(url).await?;

        let title = info["title"]
            .as_str()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("audio")
            .to_string();

        let stream = self.open_stream(url)?;

        Ok(RemoteSource {
            title,
            stream: Box::new(stream),
        })
    }

    fn supports_url(&self, url: &str) -> bool {
        // yt-dlp knows far more hosts than we could list; let it decide
        let url_lower = url.to_lowercase();
        url_lower.starts_with("http://") || url_lower.starts_with("https://")
    }

    fn platform_name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Drain stderr, then wait for the process. A non-zero exit becomes an
/// error carrying what yt-dlp printed.
async fn wait_for_exit(mut child: Child, stderr: Option<ChildStderr>) -> io::Result<()> {
    let mut message = Vec::new();
    if let Some(mut stderr) = stderr {
        stderr.read_to_end(&mut message).await?;
    }

    let status = child.wait().await?;
    if status.success() {
        return Ok(());
    }

    let message = String::from_utf8_lossy(&message);
    let message = message.trim();
    tracing::warn!(%status, stderr = message, "yt-dlp download failed");

    if message.is_empty() {
        Err(io::Error::other(format!("yt-dlp failed: exited with {}", status)))
    } else {
        Err(io::Error::other(format!("yt-dlp failed: {}", message)))
    }
}

/// stdout of a running yt-dlp process.
///
/// End of output is only reported once the process has exited successfully;
/// a failed download surfaces as a read error. Dropping the stream kills the
/// process.
pub struct ProcessStream {
    stdout: ChildStdout,
    exit: Option<JoinHandle<io::Result<()>>>,
}

impl AsyncRead for ProcessStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        let filled = buf.filled().len();
        match Pin::new(&mut self.stdout).poll_read(cx, buf) {
            Poll::Ready(Ok(())) if buf.filled().len() == filled => {}
            other => return other,
        }

        // stdout is at EOF; the exit status decides how the stream ends
        let Some(exit) = self.exit.as_mut() else {
            return Poll::Ready(Ok(()));
        };

        let result = match Pin::new(exit).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(result)) => result,
            Poll::Ready(Err(e)) => Err(io::Error::other(e)),
        };
        self.exit = None;

        Poll::Ready(result)
    }
}

impl Drop for ProcessStream {
    fn drop(&mut self) {
        // Dropping the task drops the child, which kills it
        if let Some(exit) = &self.exit {
            exit.abort();
        }
    }
}
