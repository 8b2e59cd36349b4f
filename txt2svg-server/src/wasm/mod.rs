//! Wasmtime integration for the compute module.
//!
//! [`WasmRuntime`] owns the engine and compiled-module cache;
//! [`WasmGuestFactory`] turns a compiled module into [`WasmGuest`]s for the
//! module host.

mod guest;
mod runtime;

pub use guest::{WasmGuest, WasmGuestFactory};
pub use runtime::{
    CompiledModule, DEFAULT_IMPORTED_MEMORY_PAGES, EPOCH_TICK, WASM_PAGE_SIZE, WasmRuntime,
    WasmRuntimeConfig,
};
