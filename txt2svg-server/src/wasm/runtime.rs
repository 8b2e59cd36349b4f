//! WASM runtime management using Wasmtime.
//!
//! Provides engine configuration, module compilation and caching, and the
//! epoch ticker that backs per-call deadlines.

use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use txt2svg_core::error::{Result, Txt2SvgError};
use wasmtime::{Config, Engine, Module};

/// Default maximum memory pages (64 KB per page).
const DEFAULT_MAX_MEMORY_PAGES: u32 = 1024; // 64 MB

/// Pages given to an imported `env.memory` (8 MB).
pub const DEFAULT_IMPORTED_MEMORY_PAGES: u32 = 128;

/// Default fuel amount for execution limiting.
const DEFAULT_FUEL: u64 = 10_000_000_000;

/// Interval between epoch increments while a call timeout is configured.
pub const EPOCH_TICK: Duration = Duration::from_millis(10);

/// Size of one WebAssembly page.
pub const WASM_PAGE_SIZE: usize = 64 * 1024;

/// Configuration for the WASM runtime.
#[derive(Debug, Clone)]
pub struct WasmRuntimeConfig {
    /// Maximum memory pages allowed (64 KB per page).
    pub max_memory_pages: u32,
    /// Initial pages for an `env.memory` import supplied by the host.
    pub imported_memory_pages: u32,
    /// Whether to enable fuel-based execution limiting.
    pub fuel_enabled: bool,
    /// Fuel granted to each marshaling sequence when fuel is enabled.
    pub fuel_amount: u64,
    /// Wall-clock budget for one marshaling sequence.
    ///
    /// Enforced with epoch interruption; `None` disables it.
    pub call_timeout: Option<Duration>,
    /// Whether to cache compiled modules.
    pub cache_modules: bool,
    /// Enable debug info in compiled modules.
    pub debug_info: bool,
}

impl Default for WasmRuntimeConfig {
    fn default() -> Self {
        Self {
            max_memory_pages: DEFAULT_MAX_MEMORY_PAGES,
            imported_memory_pages: DEFAULT_IMPORTED_MEMORY_PAGES,
            fuel_enabled: false,
            fuel_amount: DEFAULT_FUEL,
            call_timeout: Some(Duration::from_secs(10)),
            cache_modules: true,
            debug_info: false,
        }
    }
}

impl WasmRuntimeConfig {
    /// Create a configuration for testing with stricter limits.
    pub fn testing() -> Self {
        Self {
            max_memory_pages: 256, // 16 MB
            imported_memory_pages: 4,
            fuel_enabled: true,
            fuel_amount: 10_000_000,
            call_timeout: Some(Duration::from_secs(2)),
            cache_modules: false,
            debug_info: true,
        }
    }

    /// Set maximum memory pages.
    pub fn with_max_memory_pages(mut self, pages: u32) -> Self {
        self.max_memory_pages = pages;
        self
    }

    /// Set the initial size of a host-supplied `env.memory`.
    pub fn with_imported_memory_pages(mut self, pages: u32) -> Self {
        self.imported_memory_pages = pages;
        self
    }

    /// Enable or disable fuel-based limiting.
    pub fn with_fuel(mut self, enabled: bool, amount: u64) -> Self {
        self.fuel_enabled = enabled;
        self.fuel_amount = amount;
        self
    }

    /// Set or clear the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Enable or disable module caching.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_modules = enabled;
        self
    }

    /// Maximum linear memory size in bytes.
    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_pages as usize * WASM_PAGE_SIZE
    }

    /// Epoch ticks a store may run before it is interrupted.
    ///
    /// One extra tick covers a tick landing right after the deadline is set.
    pub fn deadline_ticks(&self) -> Option<u64> {
        self.call_timeout.map(|timeout| {
            let ticks = timeout.as_millis().div_ceil(EPOCH_TICK.as_millis()).max(1);
            ticks as u64 + 1
        })
    }

    /// Create a Wasmtime Config from this configuration.
    fn to_wasmtime_config(&self) -> Config {
        let mut config = Config::new();

        config.epoch_interruption(self.call_timeout.is_some());
        config.consume_fuel(self.fuel_enabled);
        config.debug_info(self.debug_info);
        config.strategy(wasmtime::Strategy::Cranelift);

        config
    }
}

/// A compiled WASM module ready for instantiation.
pub struct CompiledModule {
    /// Display name (file name or caller-supplied label).
    name: String,
    /// The compiled Wasmtime module.
    module: Module,
    /// Content hash of the WASM bytes, used as the cache key.
    hash: u64,
}

impl CompiledModule {
    /// Get the module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the underlying Wasmtime module.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Get the hash of this module.
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

/// Background thread advancing the engine epoch.
struct EpochTicker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EpochTicker {
    fn start(engine: Engine) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("txt2svg-epoch".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    std::thread::sleep(EPOCH_TICK);
                    engine.increment_epoch();
                }
            })
            .map_err(|e| Txt2SvgError::WasmLoad {
                module: "engine".to_string(),
                cause: format!("Failed to start epoch ticker: {}", e),
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for EpochTicker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// WASM runtime managing the Wasmtime engine and compiled modules.
pub struct WasmRuntime {
    /// The Wasmtime engine (thread-safe, can be shared).
    engine: Engine,
    /// Configuration for this runtime.
    config: WasmRuntimeConfig,
    /// Cache of compiled modules by their content hash.
    module_cache: DashMap<u64, Arc<CompiledModule>>,
    /// Present while epoch deadlines are in use.
    _ticker: Option<EpochTicker>,
}

impl WasmRuntime {
    /// Create a new WASM runtime with the given configuration.
    pub fn new(config: WasmRuntimeConfig) -> Result<Self> {
        let wasmtime_config = config.to_wasmtime_config();
        let engine = Engine::new(&wasmtime_config).map_err(|e| Txt2SvgError::WasmLoad {
            module: "engine".to_string(),
            cause: e.to_string(),
        })?;

        let ticker = match config.call_timeout {
            Some(_) => Some(EpochTicker::start(engine.clone())?),
            None => None,
        };

        Ok(Self {
            engine,
            config,
            module_cache: DashMap::new(),
            _ticker: ticker,
        })
    }

    /// Create a new runtime with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(WasmRuntimeConfig::default())
    }

    /// Get the Wasmtime engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Get the runtime configuration.
    pub fn config(&self) -> &WasmRuntimeConfig {
        &self.config
    }

    /// Compile WASM bytes into a module.
    ///
    /// If caching is enabled and the module was previously compiled,
    /// returns the cached version.
    pub fn compile(&self, name: &str, wasm_bytes: &[u8]) -> Result<Arc<CompiledModule>> {
        let hash = hash_bytes(wasm_bytes);

        if self.config.cache_modules {
            if let Some(cached) = self.module_cache.get(&hash) {
                return Ok(Arc::clone(&cached));
            }
        }

        let module = Module::new(&self.engine, wasm_bytes).map_err(|e| Txt2SvgError::WasmLoad {
            module: name.to_string(),
            cause: e.to_string(),
        })?;

        let compiled = Arc::new(CompiledModule {
            name: name.to_string(),
            module,
            hash,
        });

        if self.config.cache_modules {
            self.module_cache.insert(hash, Arc::clone(&compiled));
        }

        tracing::debug!(module = name, hash = format!("{:016x}", hash), "Compiled module");
        Ok(compiled)
    }

    /// Compile WASM bytes from a file.
    pub fn compile_file(&self, path: &Path) -> Result<Arc<CompiledModule>> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        let wasm_bytes = std::fs::read(path).map_err(|e| Txt2SvgError::Io {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;

        self.compile(name, &wasm_bytes)
    }

    /// Get the number of cached modules.
    pub fn cache_size(&self) -> usize {
        self.module_cache.len()
    }

    /// Get the fuel granted to each marshaling sequence.
    pub fn fuel_per_call(&self) -> Option<u64> {
        if self.config.fuel_enabled {
            Some(self.config.fuel_amount)
        } else {
            None
        }
    }
}

/// Simple hash function for WASM bytes (FNV-1a).
fn hash_bytes(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut hash = FNV_OFFSET;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
