//! Response body types
//!
//! All handlers answer with a boxed body so buffered responses and streamed
//! file downloads share one service type.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

/// Body type of every response this server produces
pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// Read chunk size for streamed files
const CHUNK_SIZE: u64 = 64 * 1024;

/// Buffered body from in-memory content
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Body with no content (HEAD, 204, 304)
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

/// Streams an open file in fixed-size chunks
///
/// Sends at most `remaining` bytes, the size observed when the file was
/// opened, so data appended afterwards never overruns the Content-Length.
pub struct FileBody {
    file: File,
    remaining: u64,
}

impl FileBody {
    pub const fn new(file: File, len: u64) -> Self {
        Self {
            file,
            remaining: len,
        }
    }

    pub fn boxed(self) -> ResponseBody {
        BodyExt::boxed(self)
    }
}

impl Body for FileBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        if self.remaining == 0 {
            return Poll::Ready(None);
        }

        // Bounded by CHUNK_SIZE, always fits in usize
        #[allow(clippy::cast_possible_truncation)]
        let want = self.remaining.min(CHUNK_SIZE) as usize;
        let mut chunk = vec![0u8; want];
        let mut buf = ReadBuf::new(&mut chunk);

        match Pin::new(&mut self.file).poll_read(cx, &mut buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => Poll::Ready(Some(Err(e))),
            Poll::Ready(Ok(())) => {
                let read = buf.filled().len();
                if read == 0 {
                    // File shrank underneath us
                    self.remaining = 0;
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "file truncated while streaming",
                    ))));
                }
                chunk.truncate(read);
                self.remaining -= read as u64;
                Poll::Ready(Some(Ok(Frame::data(Bytes::from(chunk)))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_body_streams_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.log");
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let file = File::open(&path).await.unwrap();
        let body = FileBody::new(file, content.len() as u64);
        assert_eq!(body.size_hint().exact(), Some(content.len() as u64));

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), content.as_slice());
    }

    #[tokio::test]
    async fn test_file_body_stops_at_opened_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grow.log");
        std::fs::write(&path, b"hello world").unwrap();

        let file = File::open(&path).await.unwrap();
        let collected = FileBody::new(file, 5).collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn test_buffered_bodies() {
        let collected = full("abc").collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), b"abc");
        assert!(empty().is_end_stream());
    }
}
