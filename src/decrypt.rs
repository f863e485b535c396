//! Fragment decryption
//!
//! The desktop client prepends 9 bytes of junk to every `.m4s` fragment it
//! writes. "Decrypting" a fragment means dropping those bytes from the start of
//! the logical stream and passing everything else through untouched.
//!
//! The transform works chunk by chunk over any `Stream` of [`Bytes`], so memory
//! use is bounded by the read-chunk size no matter how large the fragment is.
//! The strip count belongs to the stream, not to a chunk: a first chunk shorter
//! than the header simply carries the remainder into the next one.

use bytes::{Buf, Bytes};
use futures::{Stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::io::{ReaderStream, StreamReader};

use crate::error::{AssemblyError, Error, Result};

/// Number of junk bytes at the start of every fragment
pub const HEADER_LEN: usize = 9;

/// Stream adapter that drops the first [`HEADER_LEN`] bytes of its input
#[derive(Debug)]
pub struct FragmentDecryptor<S> {
    inner: S,
    remaining: usize,
}

impl<S> FragmentDecryptor<S> {
    /// Wrap a byte-chunk stream
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            remaining: HEADER_LEN,
        }
    }
}

impl<S> Stream for FragmentDecryptor<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let mut chunk = match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(chunk)) => chunk,
                other => return Poll::Ready(other),
            };

            if self.remaining > 0 {
                let strip = self.remaining.min(chunk.len());
                chunk.advance(strip);
                self.remaining -= strip;
            }

            if !chunk.is_empty() {
                return Poll::Ready(Some(Ok(chunk)));
            }
        }
    }
}

/// Decrypt an async reader, reading at most `chunk_size` bytes at a time
pub fn decrypt_reader<R>(reader: R, chunk_size: usize) -> FragmentDecryptor<ReaderStream<R>>
where
    R: AsyncRead + Unpin,
{
    FragmentDecryptor::new(ReaderStream::with_capacity(reader, chunk_size))
}

type ChunkStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// A decrypted fragment ready to be handed to a [`Remuxer`](crate::remux::Remuxer)
///
/// Keeps the source path so read failures can name the fragment.
pub struct FragmentStream {
    path: PathBuf,
    inner: ChunkStream,
}

impl FragmentStream {
    /// Wrap an already-decrypted chunk stream
    pub fn new<S>(path: impl Into<PathBuf>, stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            path: path.into(),
            inner: Box::pin(stream),
        }
    }

    /// Path of the fragment file this stream reads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// View the decrypted bytes as an `AsyncRead`
    pub fn into_reader(self) -> impl AsyncRead + Send {
        StreamReader::new(self.inner)
    }

    /// Copy every decrypted byte into `writer`, returning the byte count
    ///
    /// # Errors
    ///
    /// Read failures become [`AssemblyError::FragmentRead`] with this
    /// fragment's path; write failures are returned as [`Error::Io`].
    pub async fn write_to<W>(mut self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.inner.next().await {
            let chunk = chunk.map_err(|source| AssemblyError::FragmentRead {
                path: self.path.clone(),
                source,
            })?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }
}

impl Stream for FragmentStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for FragmentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentStream")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Open a fragment file and wrap it with the decryptor
///
/// # Errors
///
/// Returns [`AssemblyError::FragmentRead`] if the file cannot be opened.
pub async fn open_fragment(path: &Path, chunk_size: usize) -> Result<FragmentStream> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| -> Error {
            AssemblyError::FragmentRead {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })?;
    Ok(FragmentStream::new(path, decrypt_reader(file, chunk_size)))
}
