//! Error types
//!
//! Every failure a file request can hit, each mapped to exactly one HTTP status.

use hyper::StatusCode;
use std::io;
use std::path::PathBuf;

/// Errors produced while resolving, opening, or reading a served file
#[derive(Debug, thiserror::Error)]
pub enum FileServerError {
    /// Required query parameter absent
    #[error("No {0} given")]
    MissingParameter(&'static str),

    /// Query parameter present but not a non-negative integer
    #[error("Invalid value '{value}' for parameter {name}")]
    InvalidParameter { name: &'static str, value: String },

    /// Requested path escapes the root directory or is not a usable relative path
    #[error("Invalid path {0}")]
    InvalidPath(String),

    /// Requested path does not name an existing regular file
    #[error("File {0} not found")]
    NotFound(String),

    /// Byte range is not valid UTF-8 (strict decoding only)
    #[error("File {path} is not valid UTF-8 in range starting at {offset}")]
    Decode { path: String, offset: u64 },

    /// Root directory is missing or not a directory (startup only)
    #[error("Invalid root directory {}: {source}", .path.display())]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FileServerError {
    /// HTTP status code this error is reported with
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidParameter { .. } | Self::InvalidPath(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Decode { .. } | Self::InvalidRoot { .. } | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the failure is the server's fault rather than the caller's
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

pub type Result<T> = std::result::Result<T, FileServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FileServerError::MissingParameter("path").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FileServerError::InvalidPath("../x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FileServerError::NotFound("a.log".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FileServerError::Io(io::Error::other("disk")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(FileServerError::Decode {
            path: "a.log".to_string(),
            offset: 0
        }
        .is_server_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            FileServerError::MissingParameter("path").to_string(),
            "No path given"
        );
        assert_eq!(
            FileServerError::NotFound("missing.log".to_string()).to_string(),
            "File missing.log not found"
        );
    }
}
