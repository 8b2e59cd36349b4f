//! Compute modules written in WAT for integration tests.
//!
//! Every module follows the same ABI as the production module: a bump
//! allocator rewound to offset 1024 by `wasm_reset_heap`, and a
//! `wasm_generate_svg` entry point writing into the caller's buffer.

#![allow(dead_code)]

use std::sync::Arc;
use txt2svg_core::host::{InstancePolicy, SvgGenerator};
use txt2svg_core::marshal::MarshalConfig;
use txt2svg_server::assets::MemoryAssetStore;
use txt2svg_server::service::wasm_generator;
use txt2svg_server::wasm::{WasmRuntime, WasmRuntimeConfig};

/// Fake TTF bytes; the test modules never parse them.
pub const FONT_BYTES: &[u8] = b"\x00\x01\x00\x00test-font";

/// Linear memory imported from the host.
pub const IMPORTED_MEMORY: &str = r#"(import "env" "memory" (memory 2))"#;

/// Linear memory owned and exported by the module.
pub const EXPORTED_MEMORY: &str = r#"(memory (export "memory") 2)"#;

const ALLOCATOR: &str = r#"
    (global $heap (mut i32) (i32.const 0))
    (func (export "wasm_reset_heap")
        (global.set $heap (i32.const 1024)))
    (func (export "wasm_alloc") (param $size i32) (result i32)
        (local $ptr i32)
        (local.set $ptr (global.get $heap))
        (global.set $heap (i32.add (global.get $heap) (local.get $size)))
        (local.get $ptr))
"#;

/// Module whose entry point writes
/// `<svg ...><text fill='COLOR'>TEXT</text></svg>` plus a terminator.
///
/// Returns 0 without writing when the font is empty.
pub fn echo_module(memory: &str) -> Vec<u8> {
    let wat = format!(
        r#"(module
            {memory}
            (data (i32.const 16) "<svg xmlns='http://www.w3.org/2000/svg'><text fill='\00")
            (data (i32.const 128) "'>\00")
            (data (i32.const 160) "</text></svg>\00")
            {ALLOCATOR}
            (func $append (param $dst i32) (param $src i32) (result i32)
                (local $b i32)
                (block $done
                    (loop $copy
                        (local.set $b (i32.load8_u (local.get $src)))
                        (br_if $done (i32.eqz (local.get $b)))
                        (i32.store8 (local.get $dst) (local.get $b))
                        (local.set $dst (i32.add (local.get $dst) (i32.const 1)))
                        (local.set $src (i32.add (local.get $src) (i32.const 1)))
                        (br $copy)))
                (local.get $dst))
            (func (export "wasm_generate_svg")
                (param $text i32) (param $font i32) (param $font_len i32)
                (param $color i32) (param $out i32) (param $out_max i32) (result i32)
                (local $end i32)
                (if (i32.eqz (local.get $font_len))
                    (then (return (i32.const 0))))
                (local.set $end (call $append (local.get $out) (i32.const 16)))
                (local.set $end (call $append (local.get $end) (local.get $color)))
                (local.set $end (call $append (local.get $end) (i32.const 128)))
                (local.set $end (call $append (local.get $end) (local.get $text)))
                (local.set $end (call $append (local.get $end) (i32.const 160)))
                (i32.store8 (local.get $end) (i32.const 0))
                (i32.sub (local.get $end) (local.get $out))))"#
    );
    wat::parse_str(wat).expect("Failed to parse WAT")
}

/// Module whose entry point writes nothing and returns 0.
pub fn silent_module() -> Vec<u8> {
    with_entry_point("(i32.const 0)")
}

/// Module whose entry point traps.
pub fn trapping_module() -> Vec<u8> {
    with_entry_point("(unreachable)")
}

/// Module whose entry point never returns.
pub fn spinning_module() -> Vec<u8> {
    with_entry_point("(loop $spin (br $spin)) (i32.const 0)")
}

/// Module missing `wasm_generate_svg`.
pub fn module_without_entry_point() -> Vec<u8> {
    let wat = format!("(module {IMPORTED_MEMORY} {ALLOCATOR})");
    wat::parse_str(wat).expect("Failed to parse WAT")
}

/// Module importing a host function the server does not provide.
pub fn module_with_foreign_import() -> Vec<u8> {
    let wat = format!(
        r#"(module
            (import "env" "abort" (func (param i32)))
            {IMPORTED_MEMORY}
            {ALLOCATOR}
            (func (export "wasm_generate_svg")
                (param i32 i32 i32 i32 i32 i32) (result i32)
                (i32.const 0)))"#
    );
    wat::parse_str(wat).expect("Failed to parse WAT")
}

fn with_entry_point(body: &str) -> Vec<u8> {
    let wat = format!(
        r#"(module
            {IMPORTED_MEMORY}
            {ALLOCATOR}
            (func (export "wasm_generate_svg")
                (param i32 i32 i32 i32 i32 i32) (result i32)
                {body}))"#
    );
    wat::parse_str(wat).expect("Failed to parse WAT")
}

/// Runtime configuration used by the integration tests.
pub fn runtime_config() -> WasmRuntimeConfig {
    WasmRuntimeConfig::default().with_cache(false)
}

/// Compile `wasm` and wrap it in a warmed-up module host.
pub fn generator(
    wasm: &[u8],
    config: WasmRuntimeConfig,
    policy: InstancePolicy,
) -> Arc<dyn SvgGenerator> {
    let runtime = Arc::new(WasmRuntime::new(config).expect("Failed to create runtime"));
    let module = runtime.compile("test", wasm).expect("Failed to compile module");
    wasm_generator(runtime, module, policy, MarshalConfig::default())
        .expect("Failed to build generator")
}

/// Asset store with all three catalog fonts and a small site.
pub fn asset_store() -> MemoryAssetStore {
    MemoryAssetStore::new()
        .with_asset("fonts/Roboto.ttf", FONT_BYTES)
        .with_asset("fonts/WendyOne.ttf", FONT_BYTES)
        .with_asset("fonts/AlfaSlabOne.ttf", FONT_BYTES)
        .with_asset("index.html", "<!doctype html><title>txt2svg</title>")
        .with_asset("css/site.css", "body { margin: 0 }")
}
