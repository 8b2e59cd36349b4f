//! Wasmtime-backed implementation of the guest ABI.
//!
//! A [`WasmGuest`] is one store plus one instance of the compute module.
//! The module must export:
//!
//! | Export | Signature |
//! |:-------|:----------|
//! | `wasm_reset_heap` | `() -> ()` |
//! | `wasm_alloc` | `(size: u32) -> u32` |
//! | `wasm_generate_svg` | `(text, font, font_len, color, out, out_max: u32) -> i32` |
//!
//! Linear memory is either imported as `env.memory`, in which case the host
//! creates it, or exported as `memory`.

use super::runtime::{CompiledModule, WasmRuntime};
use std::sync::Arc;
use txt2svg_core::error::{Result, Txt2SvgError};
use txt2svg_core::guest::{GenerateCall, GuestFactory, GuestModule};
use wasmtime::{
    ExternType, Linker, Memory, MemoryType, Store, StoreLimits, StoreLimitsBuilder, Trap,
    TypedFunc,
};

const RESET_EXPORT: &str = "wasm_reset_heap";
const ALLOC_EXPORT: &str = "wasm_alloc";
const GENERATE_EXPORT: &str = "wasm_generate_svg";
const MEMORY_EXPORT: &str = "memory";

type GenerateArgs = (u32, u32, u32, u32, u32, u32);

/// Per-store host data.
struct GuestState {
    limits: StoreLimits,
}

/// Budget applied at the start of every marshaling sequence.
#[derive(Debug, Clone, Copy)]
struct CallBudget {
    fuel: Option<u64>,
    deadline_ticks: Option<u64>,
    timeout_ms: u64,
}

/// One instantiated compute module.
pub struct WasmGuest {
    store: Store<GuestState>,
    memory: Memory,
    reset_fn: TypedFunc<(), ()>,
    alloc_fn: TypedFunc<u32, u32>,
    generate_fn: TypedFunc<GenerateArgs, i32>,
    budget: CallBudget,
}

impl WasmGuest {
    /// Instantiate `module` in a fresh store.
    pub fn instantiate(runtime: &WasmRuntime, module: &CompiledModule) -> Result<Self> {
        let config = runtime.config();
        let load_error = |cause: String| Txt2SvgError::WasmLoad {
            module: module.name().to_string(),
            cause,
        };

        let budget = CallBudget {
            fuel: runtime.fuel_per_call(),
            deadline_ticks: config.deadline_ticks(),
            timeout_ms: config
                .call_timeout
                .map(|t| t.as_millis() as u64)
                .unwrap_or_default(),
        };

        let limits = StoreLimitsBuilder::new()
            .memory_size(config.max_memory_bytes())
            .build();
        let mut store = Store::new(runtime.engine(), GuestState { limits });
        store.limiter(|state| &mut state.limits);
        // A start function runs under the same budget as a call.
        arm_budget(&mut store, budget)?;

        let mut linker: Linker<GuestState> = Linker::new(runtime.engine());
        let mut imported_memory = None;

        for import in module.module().imports() {
            match import.ty() {
                ExternType::Memory(ty)
                    if import.module() == "env" && import.name() == "memory" =>
                {
                    let minimum = u32::try_from(ty.minimum())
                        .map_err(|_| load_error("env.memory minimum out of range".to_string()))?;
                    let pages = minimum.max(config.imported_memory_pages);
                    let maximum = ty.maximum().and_then(|m| u32::try_from(m).ok());
                    let memory = Memory::new(&mut store, MemoryType::new(pages, maximum))
                        .map_err(|e| load_error(format!("Failed to create env.memory: {}", e)))?;
                    linker
                        .define(&store, "env", "memory", memory)
                        .map_err(|e| load_error(e.to_string()))?;
                    imported_memory = Some(memory);
                }
                _ => {
                    return Err(load_error(format!(
                        "Unsupported import '{}.{}'",
                        import.module(),
                        import.name()
                    )));
                }
            }
        }

        let instance = linker
            .instantiate(&mut store, module.module())
            .map_err(|e| load_error(format!("Failed to instantiate module: {}", e)))?;

        let memory = instance
            .get_memory(&mut store, MEMORY_EXPORT)
            .or(imported_memory)
            .ok_or_else(|| Txt2SvgError::WasmExport {
                name: MEMORY_EXPORT,
                cause: "module neither imports env.memory nor exports memory".to_string(),
            })?;

        let reset_fn = instance
            .get_typed_func::<(), ()>(&mut store, RESET_EXPORT)
            .map_err(|e| export_error(RESET_EXPORT, e))?;
        let alloc_fn = instance
            .get_typed_func::<u32, u32>(&mut store, ALLOC_EXPORT)
            .map_err(|e| export_error(ALLOC_EXPORT, e))?;
        let generate_fn = instance
            .get_typed_func::<GenerateArgs, i32>(&mut store, GENERATE_EXPORT)
            .map_err(|e| export_error(GENERATE_EXPORT, e))?;

        tracing::debug!(
            module = module.name(),
            memory_bytes = memory.data_size(&store),
            imported_memory = imported_memory.is_some(),
            "Instantiated compute module"
        );

        Ok(Self {
            store,
            memory,
            reset_fn,
            alloc_fn,
            generate_fn,
            budget,
        })
    }

    /// Current size of linear memory in bytes.
    pub fn memory_size(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    fn call_error(&self, function: &'static str, err: wasmtime::Error) -> Txt2SvgError {
        match err.downcast_ref::<Trap>() {
            Some(Trap::Interrupt) => Txt2SvgError::WasmTimeout {
                function,
                timeout_ms: self.budget.timeout_ms,
            },
            Some(Trap::OutOfFuel) => Txt2SvgError::WasmExecution {
                function,
                cause: "fuel exhausted".to_string(),
            },
            _ => Txt2SvgError::WasmExecution {
                function,
                cause: err.to_string(),
            },
        }
    }
}

impl GuestModule for WasmGuest {
    fn memory(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.memory.data_mut(&mut self.store)
    }

    /// Starts a sequence: the budget covers everything up to the next reset.
    fn reset_heap(&mut self) -> Result<()> {
        arm_budget(&mut self.store, self.budget)?;
        self.reset_fn
            .call(&mut self.store, ())
            .map_err(|e| self.call_error(RESET_EXPORT, e))
    }

    fn alloc(&mut self, size: u32) -> Result<u32> {
        self.alloc_fn
            .call(&mut self.store, size)
            .map_err(|e| self.call_error(ALLOC_EXPORT, e))
    }

    fn generate_svg(&mut self, call: GenerateCall) -> Result<i32> {
        let args = (
            call.text_ptr,
            call.font_ptr,
            call.font_len,
            call.color_ptr,
            call.out_ptr,
            call.out_capacity,
        );
        self.generate_fn
            .call(&mut self.store, args)
            .map_err(|e| self.call_error(GENERATE_EXPORT, e))
    }
}

/// Refill fuel and re-arm the epoch deadline.
fn arm_budget(store: &mut Store<GuestState>, budget: CallBudget) -> Result<()> {
    if let Some(fuel) = budget.fuel {
        store
            .set_fuel(fuel)
            .map_err(|e| Txt2SvgError::WasmExecution {
                function: RESET_EXPORT,
                cause: format!("Failed to set fuel: {}", e),
            })?;
    }
    if let Some(ticks) = budget.deadline_ticks {
        store.set_epoch_deadline(ticks);
        store.epoch_deadline_trap();
    }
    Ok(())
}

fn export_error(name: &'static str, err: wasmtime::Error) -> Txt2SvgError {
    Txt2SvgError::WasmExport {
        name,
        cause: err.to_string(),
    }
}

/// Creates [`WasmGuest`]s from one compiled module.
#[derive(Clone)]
pub struct WasmGuestFactory {
    runtime: Arc<WasmRuntime>,
    module: Arc<CompiledModule>,
}

impl WasmGuestFactory {
    /// Create a factory.
    pub fn new(runtime: Arc<WasmRuntime>, module: Arc<CompiledModule>) -> Self {
        Self { runtime, module }
    }

    /// Get the compiled module.
    pub fn module(&self) -> &CompiledModule {
        &self.module
    }
}

impl GuestFactory for WasmGuestFactory {
    type Guest = WasmGuest;

    fn instantiate(&self) -> Result<WasmGuest> {
        WasmGuest::instantiate(&self.runtime, &self.module)
    }
}
