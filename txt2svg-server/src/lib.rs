//! txt2svg server - hosts the compute module behind HTTP.
//!
//! This crate provides:
//! - Wasmtime runtime, module cache and the [`wasm::WasmGuest`] ABI binding
//! - Asset stores for fonts and static files
//! - The render orchestrator
//! - The HTTP API (`GET /service` plus static files)
//! - Logging setup

#![warn(missing_docs)]

pub mod api;
pub mod assets;
pub mod observability;
pub mod render;
pub mod service;
pub mod wasm;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::api::{ApiError, ApiServer, AppState, ServerConfig};
    pub use crate::assets::{AssetStore, DirAssetStore, MemoryAssetStore};
    pub use crate::observability::{LogFormat, TracingConfig, init_tracing};
    pub use crate::render::RenderService;
    pub use crate::service::{ServiceConfig, wasm_generator};
    pub use crate::wasm::{WasmGuest, WasmGuestFactory, WasmRuntime, WasmRuntimeConfig};
}
