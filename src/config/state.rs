// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::storage::FileStore;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Upload directory handle used by every handler
    pub store: FileStore,
    /// Notified once when the process should stop accepting connections
    pub shutdown_signal: Arc<Notify>,
}

impl AppState {
    pub fn new(config: &Config, store: FileStore) -> Self {
        Self {
            config: config.clone(),
            store,
            shutdown_signal: Arc::new(Notify::new()),
        }
    }
}
