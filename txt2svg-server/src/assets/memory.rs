//! In-memory asset store.

use super::{AssetFuture, AssetStore, validate_asset_path};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use txt2svg_core::error::{Result, Txt2SvgError};

/// Asset store holding its assets in a map.
///
/// Counts fetches so tests can assert that a request never reached the
/// store.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: RwLock<HashMap<String, Bytes>>,
    fetches: AtomicU64,
}

impl MemoryAssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset (builder style).
    pub fn with_asset(self, path: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Add or replace an asset.
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Bytes>) {
        self.assets.write().insert(path.into(), bytes.into());
    }

    /// Remove an asset.
    pub fn remove(&self, path: &str) -> Option<Bytes> {
        self.assets.write().remove(path)
    }

    /// Number of fetch calls so far, including failed ones.
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lookup(&self, path: &str) -> Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let relative = validate_asset_path(path)?;
        self.assets
            .read()
            .get(relative)
            .cloned()
            .ok_or_else(|| Txt2SvgError::AssetNotFound {
                path: relative.to_string(),
            })
    }
}

impl AssetStore for MemoryAssetStore {
    fn fetch<'a>(&'a self, path: &'a str) -> AssetFuture<'a> {
        let result = self.lookup(path);
        Box::pin(async move { result })
    }

    fn describe(&self) -> String {
        format!("memory:{} assets", self.assets.read().len())
    }
}
