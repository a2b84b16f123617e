use async_trait::async_trait;
use thiserror::Error;

pub mod direct;
pub mod youtube;

use crate::transcoder::MediaStream;
use crate::utils;

/// A resolved remote video: its title and a readable audio/video stream
pub struct RemoteSource {
    /// Title reported by the source
    pub title: String,

    /// Media bytes, ready to be piped into the transcoder
    pub stream: MediaStream,
}

impl std::fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSource")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Resolution failure, carrying the underlying message
#[derive(Error, Debug)]
#[error("Erro ao processar URL do YouTube: {message}")]
pub struct ResolveError {
    message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying message without the prefix
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for ResolveError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}

/// Turns a URL into a [`RemoteSource`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamResolver: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RemoteSource, ResolveError>;
}

/// One way of opening remote media
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Resolve metadata and open the byte stream
    async fn open(&self, url: &str) -> crate::Result<RemoteSource>;

    /// Check if this source handles the given URL
    fn supports_url(&self, url: &str) -> bool;

    /// Get the name of this source
    fn platform_name(&self) -> &'static str;
}

/// Registry picking the first source that supports a URL
pub struct ResolverRegistry {
    sources: Vec<Box<dyn MediaSource>>,
}

impl ResolverRegistry {
    /// Create a registry with the default sources
    pub fn new(yt_dlp_path: impl Into<String>) -> Self {
        let mut registry = Self::empty();

        // Direct media links first, yt-dlp takes everything else
        registry.register(Box::new(direct::DirectSource::new()));
        registry.register(Box::new(youtube::YtDlpSource::new(yt_dlp_path)));

        registry
    }

    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Register a new source
    pub fn register(&mut self, source: Box<dyn MediaSource>) {
        self.sources.push(source);
    }

    /// Find a source that supports the given URL
    pub fn find_source(&self, url: &str) -> Option<&dyn MediaSource> {
        self.sources
            .iter()
            .find(|source| source.supports_url(url))
            .map(|boxed| boxed.as_ref())
    }

    /// List all registered sources
    pub fn list_platforms(&self) -> Vec<&'static str> {
        self.sources
            .iter()
            .map(|source| source.platform_name())
            .collect()
    }
}

#[async_trait]
impl StreamResolver for ResolverRegistry {
    async fn fetch(&self, url: &str) -> Result<RemoteSource, ResolveError> {
        let parsed = utils::validate_url(url)?;

        let source = self
            .find_source(parsed.as_str())
            .ok_or_else(|| ResolveError::new(format!("No resolver found for URL: {}", url)))?;

        tracing::info!(platform = source.platform_name(), "Resolving {}", url);

        let remote = source.open(parsed.as_str()).await?;
        tracing::debug!(title = %remote.title, "Resolved remote source");

        Ok(remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource;

    #[async_trait]
    impl MediaSource for StaticSource {
        async fn open(&self, _url: &str) -> crate::Result<RemoteSource> {
            Ok(RemoteSource {
                title: "Static".to_string(),
                stream: Box::new(tokio::io::empty()),
            })
        }

        fn supports_url(&self, url: &str) -> bool {
            url.contains("static.example")
        }

        fn platform_name(&self) -> &'static str {
            "Static"
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_with_detail() {
        let registry = ResolverRegistry::new("video2mp3-no-such-ytdlp");

        let err = registry.fetch("not a real url").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Erro ao processar URL do YouTube: Invalid URL format: not a real url"
        );
    }

    #[tokio::test]
    async fn test_unsupported_url() {
        let mut registry = ResolverRegistry::empty();
        registry.register(Box::new(StaticSource));

        let err = registry.fetch("https://other.example/watch").await.unwrap_err();
        assert!(err.message().starts_with("No resolver found"));
    }

    #[tokio::test]
    async fn test_fetch_uses_matching_source() {
        let mut registry = ResolverRegistry::empty();
        registry.register(Box::new(StaticSource));

        let remote = registry.fetch("https://static.example/video").await.unwrap();
        assert_eq!(remote.title, "Static");
    }

    #[test]
    fn test_default_sources_order() {
        let registry = ResolverRegistry::new("yt-dlp");
        assert_eq!(registry.list_platforms(), vec!["Direct URL", "yt-dlp"]);

        let direct = registry.find_source("https://cdn.example.com/clip.mp4").unwrap();
        assert_eq!(direct.platform_name(), "Direct URL");

        let page = registry.find_source("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(page.platform_name(), "yt-dlp");
    }

    #[tokio::test]
    async fn test_missing_ytdlp_surfaces_error() {
        let registry = ResolverRegistry::new("video2mp3-no-such-ytdlp");

        let err = registry
            .fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Erro ao processar URL do YouTube:"));
        assert!(err.message().contains("yt-dlp"));
    }
}
