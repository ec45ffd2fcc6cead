// Application state module
// Immutable per-process state shared by every connection task

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::error::Result;
use crate::files::RangeFileServer;

/// Application state
pub struct AppState {
    pub config: Config,
    pub files: RangeFileServer,
    /// Connections currently being served
    pub active_connections: Arc<AtomicUsize>,
    /// Notified when the process should stop accepting connections
    pub shutdown: Arc<Notify>,
}

impl AppState {
    /// Build state from configuration, validating the root directory
    pub fn new(config: &Config) -> Result<Self> {
        let files = RangeFileServer::from_config(&config.files)?;
        Ok(Self::with_files(config, files))
    }

    pub fn with_files(config: &Config, files: RangeFileServer) -> Self {
        Self {
            config: config.clone(),
            files,
            active_connections: Arc::new(AtomicUsize::new(0)),
            shutdown: Arc::new(Notify::new()),
        }
    }
}
