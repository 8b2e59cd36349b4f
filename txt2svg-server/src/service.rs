//! Wiring: from configuration to a ready [`RenderService`].

use crate::assets::{AssetStore, DirAssetStore};
use crate::render::RenderService;
use crate::wasm::{CompiledModule, WasmGuestFactory, WasmRuntime, WasmRuntimeConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use txt2svg_core::error::{Result, Txt2SvgError};
use txt2svg_core::host::{InstancePolicy, ModuleHost, SvgGenerator};
use txt2svg_core::marshal::{MarshalConfig, Marshaler};

/// Everything needed to stand up the renderer.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the compute module (`.wasm`).
    pub module_path: PathBuf,
    /// Root directory of static assets, including `fonts/`.
    pub assets_root: PathBuf,
    /// How module instances are shared.
    pub policy: InstancePolicy,
    /// Marshaling settings.
    pub marshal: MarshalConfig,
    /// Engine and per-call limits.
    pub runtime: WasmRuntimeConfig,
    /// Caller-side bound on one render.
    pub render_timeout: Option<Duration>,
}

impl ServiceConfig {
    /// Create a configuration with defaults for everything but the paths.
    pub fn new(module_path: impl Into<PathBuf>, assets_root: impl Into<PathBuf>) -> Self {
        Self {
            module_path: module_path.into(),
            assets_root: assets_root.into(),
            policy: InstancePolicy::default(),
            marshal: MarshalConfig::default(),
            runtime: WasmRuntimeConfig::default(),
            render_timeout: None,
        }
    }

    /// Set the instance policy.
    pub fn with_policy(mut self, policy: InstancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the marshaling settings.
    pub fn with_marshal(mut self, marshal: MarshalConfig) -> Self {
        self.marshal = marshal;
        self
    }

    /// Set the runtime settings.
    pub fn with_runtime(mut self, runtime: WasmRuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    /// Set the caller-side render timeout.
    pub fn with_render_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Check values that would only fail later, at request time.
    pub fn validate(&self) -> Result<()> {
        let capacity = self.marshal.output_capacity as usize;
        if capacity == 0 {
            return Err(config_error("output_capacity", "must be greater than zero"));
        }
        if capacity >= self.runtime.max_memory_bytes() {
            return Err(config_error(
                "output_capacity",
                format!(
                    "{} bytes does not fit in {} pages of linear memory",
                    capacity, self.runtime.max_memory_pages
                ),
            ));
        }
        if self.runtime.imported_memory_pages > self.runtime.max_memory_pages {
            return Err(config_error(
                "imported_memory_pages",
                "exceeds max_memory_pages",
            ));
        }
        if self.runtime.call_timeout == Some(Duration::ZERO) {
            return Err(config_error("call_timeout", "must be greater than zero"));
        }
        Ok(())
    }

    /// Compile the module, check that it instantiates, and open the assets.
    pub fn build(&self) -> Result<RenderService> {
        self.validate()?;

        let runtime = Arc::new(WasmRuntime::new(self.runtime.clone())?);
        let module = runtime.compile_file(&self.module_path)?;
        let generator = wasm_generator(runtime, module, self.policy, self.marshal.clone())?;
        let assets: Arc<dyn AssetStore> = Arc::new(DirAssetStore::new(&self.assets_root)?);

        tracing::info!(
            module = %self.module_path.display(),
            assets = %self.assets_root.display(),
            policy = %self.policy,
            output_capacity = self.marshal.output_capacity,
            "Renderer ready"
        );

        Ok(RenderService::new(assets, generator).with_timeout(self.render_timeout))
    }
}

/// Build a module host over a compiled module and instantiate it once.
///
/// A module with missing exports or unsatisfiable imports fails here rather
/// than on the first request.
pub fn wasm_generator(
    runtime: Arc<WasmRuntime>,
    module: Arc<CompiledModule>,
    policy: InstancePolicy,
    marshal: MarshalConfig,
) -> Result<Arc<dyn SvgGenerator>> {
    let factory = WasmGuestFactory::new(runtime, module);
    let host = ModuleHost::new(factory, policy, Marshaler::new(marshal));
    host.warm_up()?;
    Ok(Arc::new(host))
}

fn config_error(field: &str, cause: impl Into<String>) -> Txt2SvgError {
    Txt2SvgError::ConfigValue {
        field: field.to_string(),
        cause: cause.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ServiceConfig::new("txt2svg.wasm", "public").validate().unwrap();
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = ServiceConfig::new("m.wasm", "public")
            .with_marshal(MarshalConfig::default().with_output_capacity(0));
        assert_eq!(config.validate().unwrap_err().code(), "E801");
    }

    #[test]
    fn capacity_must_fit_memory() {
        let config = ServiceConfig::new("m.wasm", "public")
            .with_runtime(WasmRuntimeConfig::default().with_max_memory_pages(1))
            .with_marshal(MarshalConfig::default().with_output_capacity(64 * 1024));
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = ServiceConfig::new("m.wasm", "public").with_runtime(
            WasmRuntimeConfig::default().with_call_timeout(Some(Duration::ZERO)),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_module_fails_build() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ServiceConfig::new(dir.path().join("missing.wasm"), dir.path());
        assert_eq!(config.build().err().unwrap().code(), "E901");
    }
}
