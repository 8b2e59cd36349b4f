//! CLI command implementations.

pub mod render;
pub mod serve;
pub mod version;

use crate::EngineArgs;
use std::time::Duration;
use txt2svg_core::marshal::MarshalConfig;
use txt2svg_server::service::ServiceConfig;
use txt2svg_server::wasm::WasmRuntimeConfig;

/// Translate command-line engine settings into a service configuration.
pub fn service_config(engine: &EngineArgs) -> ServiceConfig {
    let timeout = (engine.timeout_ms > 0).then(|| Duration::from_millis(engine.timeout_ms));
    let runtime = WasmRuntimeConfig::default()
        .with_imported_memory_pages(engine.memory_pages)
        .with_call_timeout(timeout)
        .with_fuel(engine.fuel.is_some(), engine.fuel.unwrap_or_default());

    ServiceConfig::new(&engine.module, &engine.assets)
        .with_policy(engine.policy)
        .with_marshal(MarshalConfig::default().with_output_capacity(engine.output_capacity))
        .with_runtime(runtime)
}
