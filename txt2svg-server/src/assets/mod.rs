//! Static asset storage.
//!
//! Fonts and the site's static files come from an [`AssetStore`]. Paths are
//! store-relative (`fonts/Roboto.ttf`, `index.html`) and are validated by
//! [`validate_asset_path`] before any implementation sees them.

mod dir;
mod memory;
mod path;

pub use dir::DirAssetStore;
pub use memory::MemoryAssetStore;
pub use path::validate_asset_path;

use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;
use txt2svg_core::error::Result;

/// A boxed future returned by [`AssetStore::fetch`].
pub type AssetFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes>> + Send + 'a>>;

/// Read-only source of static assets.
pub trait AssetStore: Send + Sync {
    /// Fetch the asset at a store-relative path.
    ///
    /// Returns `AssetNotFound` when nothing exists at the path and
    /// `AssetPath` when the path is rejected.
    fn fetch<'a>(&'a self, path: &'a str) -> AssetFuture<'a>;

    /// Short description for startup logs.
    fn describe(&self) -> String;
}

/// Guess a content type from a path's extension.
pub fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}
