use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::Client;
use std::path::Path;
use tokio_util::io::StreamReader;
use url::Url;

use super::{MediaSource, RemoteSource};
use crate::Result;

const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "mkv", "webm", "avi", "wmv", "flv", "mpeg", "mpg", "3gp", "ts",
    "mp3", "m4a", "wav", "flac", "ogg", "aac",
];

/// Direct URL source for links that already point at a media file
pub struct DirectSource {
    client: Client,
}

impl DirectSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Check if URL points to an audio or video file
    fn is_media_url(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|parsed| {
                Path::new(parsed.path())
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.to_lowercase())
            })
            .map(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// Title from the file name, without extension and URL encoding
    fn title_from_url(url: &Url) -> Option<String> {
        url.path_segments()
            .and_then(|segments| segments.last())
            .filter(|filename| !filename.is_empty())
            .map(|filename| {
                let name = match filename.rfind('.') {
                    Some(dot_pos) if dot_pos > 0 => &filename[..dot_pos],
                    _ => filename,
                };
                urlencoding::decode(name)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| name.to_string())
                    .replace(['_', '-'], " ")
            })
    }
}

impl Default for DirectSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaSource for DirectSource {
    async fn open(&self, url: &str) -> Result<RemoteSource> {
        let parsed = Url::parse(url)
            .map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;

        let response = self.client.get(parsed.clone()).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download media: HTTP {}", response.status());
        }

        let title = Self::title_from_url(&parsed).unwrap_or_else(|| "audio".to_string());

        let body = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));

        Ok(RemoteSource {
            title,
            stream: Box::new(StreamReader::new(Box::pin(body))),
        })
    }

    fn supports_url(&self, url: &str) -> bool {
        self.is_media_url(url)
    }

    fn platform_name(&self) -> &'static str {
        "Direct URL"
    }
}
