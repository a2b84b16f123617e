use futures_util::Stream;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Deletes its files when dropped.
///
/// Handlers create one as soon as a file path exists, so the files are removed
/// on every exit path: early returns, errors, and the client going away while
/// the request is still being processed.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Track one more file
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        super::delete(&self.paths);
    }
}

/// A response body stream that owns a [`CleanupGuard`].
///
/// The files stay on disk until the body has been fully sent or the
/// connection is dropped, whichever comes first.
pub struct GuardedStream<S> {
    inner: S,
    guard: CleanupGuard,
}

impl<S> GuardedStream<S> {
    pub fn new(inner: S, guard: CleanupGuard) -> Self {
        Self { inner, guard }
    }
}

impl<S, T, E> Stream for GuardedStream<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    E: std::fmt::Display,
{
    type Item = Result<T, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let poll = Pin::new(&mut self.inner).poll_next(cx);

        if let Poll::Ready(Some(Err(e))) = &poll {
            tracing::error!(
                error = %e,
                files = ?self.guard.paths(),
                "Failed while sending file"
            );
        }

        poll
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
