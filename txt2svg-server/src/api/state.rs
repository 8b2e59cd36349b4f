//! Shared application state for API handlers.

use crate::render::RenderService;
use std::time::Instant;

/// File served for `/`.
pub const DEFAULT_INDEX_FILE: &str = "index.html";

/// Shared application state passed to all handlers.
pub struct AppState {
    /// Renders `/service` requests; also owns the asset store.
    pub renderer: RenderService,
    /// File served for directory-root requests.
    pub index_file: String,
    /// Server start time.
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state.
    pub fn new(renderer: RenderService) -> Self {
        Self {
            renderer,
            index_file: DEFAULT_INDEX_FILE.to_string(),
            start_time: Instant::now(),
        }
    }

    /// Set the file served for `/`.
    pub fn with_index_file(mut self, index_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
