//! Asset store backed by a directory on disk.

use super::{AssetFuture, AssetStore, validate_asset_path};
use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use txt2svg_core::error::{Result, Txt2SvgError};

/// Serves assets from a root directory.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    /// Create a store rooted at `root`.
    ///
    /// Fails if `root` is not an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Txt2SvgError::Io {
                path: root,
                cause: "asset root is not a directory".to_string(),
            });
        }
        Ok(Self { root })
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        let relative = validate_asset_path(path)?;
        let full = self.root.join(relative);

        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
                Err(Txt2SvgError::AssetNotFound {
                    path: relative.to_string(),
                })
            }
            Err(e) => Err(Txt2SvgError::AssetFetch {
                path: relative.to_string(),
                cause: e.to_string(),
            }),
        }
    }
}

impl AssetStore for DirAssetStore {
    fn fetch<'a>(&'a self, path: &'a str) -> AssetFuture<'a> {
        Box::pin(self.read(path))
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}
