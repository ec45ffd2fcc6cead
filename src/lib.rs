//! Job log file server
//!
//! Serves files under a configured root directory over HTTP, either as a
//! whole-file download or as a JSON byte-range slice for log tailing.

pub mod config;
pub mod error;
pub mod files;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::FileServerError;
pub use files::{RangeFileServer, ReadRequest, ReadResult};
