//! Range file server
//!
//! Turns a requested path under the root directory into either a whole-file
//! download or a bounded read of the file's bytes.

pub mod path;

use crate::config::{DecodePolicy, FilesConfig};
use crate::error::{FileServerError, Result};
use crate::http::body::FileBody;
use serde::Serialize;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Bounded read request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub path: String,
    pub offset: u64,
    /// None reads to end of file
    pub length: Option<u64>,
}

/// Result of a bounded read, serialized as the `/files/read` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadResult {
    pub data: String,
    /// Bytes actually read, may be less than requested near end of file
    pub length: u64,
    /// Echo of the requested offset
    pub offset: u64,
}

/// An opened file ready to be streamed as an attachment
pub struct Download {
    pub path: PathBuf,
    pub file_name: String,
    pub len: u64,
    pub body: FileBody,
}

/// Serves files under a fixed root directory
///
/// Holds no mutable state; every call opens and releases its own handle.
#[derive(Debug, Clone)]
pub struct RangeFileServer {
    root: PathBuf,
    max_read_length: Option<u64>,
    decode: DecodePolicy,
}

impl RangeFileServer {
    /// Create a server rooted at `root`, which must be an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = root
            .canonicalize()
            .map_err(|source| FileServerError::InvalidRoot {
                path: root.to_path_buf(),
                source,
            })?;
        if !canonical.is_dir() {
            return Err(FileServerError::InvalidRoot {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        Ok(Self {
            root: canonical,
            max_read_length: None,
            decode: DecodePolicy::default(),
        })
    }

    pub fn from_config(config: &FilesConfig) -> Result<Self> {
        Ok(Self::new(&config.root)?
            .with_max_read_length(config.max_read_length)
            .with_decode_policy(config.decode))
    }

    #[must_use]
    pub fn with_max_read_length(mut self, max: Option<u64>) -> Self {
        self.max_read_length = max;
        self
    }

    #[must_use]
    pub fn with_decode_policy(mut self, decode: DecodePolicy) -> Self {
        self.decode = decode;
        self
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a requested path to a regular file under the root
    pub async fn resolve(&self, requested: &str) -> Result<PathBuf> {
        path::resolve(&self.root, requested).await
    }

    /// Open a file for download as an attachment
    pub async fn download(&self, requested: &str) -> Result<Download> {
        let resolved = self.resolve(requested).await?;
        let file = open(&resolved, requested).await?;
        let len = file.metadata().await?.len();

        let file_name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Download {
            path: resolved,
            file_name,
            len,
            body: FileBody::new(file, len),
        })
    }

    /// Read up to `length` bytes starting at `offset`
    ///
    /// An offset past the end of file reads nothing; it is not an error.
    pub async fn read_range(&self, request: &ReadRequest) -> Result<ReadResult> {
        let resolved = self.resolve(&request.path).await?;
        let mut file = open(&resolved, &request.path).await?;

        // Offsets beyond i64::MAX cannot be seeked to at all
        let file_len = file.metadata().await?.len();
        if request.offset >= file_len {
            return Ok(ReadResult {
                data: String::new(),
                length: 0,
                offset: request.offset,
            });
        }
        file.seek(SeekFrom::Start(request.offset)).await?;

        let limit = match (request.length, self.max_read_length) {
            (Some(len), Some(max)) => Some(len.min(max)),
            (len, max) => len.or(max),
        };

        let mut bytes = Vec::new();
        match limit {
            Some(limit) => {
                file.take(limit).read_to_end(&mut bytes).await?;
            }
            None => {
                file.read_to_end(&mut bytes).await?;
            }
        }

        let length = bytes.len() as u64;
        let data = self.decode(bytes, request)?;

        Ok(ReadResult {
            data,
            length,
            offset: request.offset,
        })
    }

    fn decode(&self, bytes: Vec<u8>, request: &ReadRequest) -> Result<String> {
        match self.decode {
            DecodePolicy::Lossy => Ok(match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            }),
            DecodePolicy::Strict => String::from_utf8(bytes).map_err(|_| FileServerError::Decode {
                path: request.path.clone(),
                offset: request.offset,
            }),
        }
    }
}

async fn open(resolved: &Path, requested: &str) -> Result<File> {
    File::open(resolved).await.map_err(|e| {
        // Removed between resolve and open
        if e.kind() == std::io::ErrorKind::NotFound {
            FileServerError::NotFound(requested.to_string())
        } else {
            FileServerError::Io(e)
        }
    })
}
