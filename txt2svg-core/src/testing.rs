//! Deterministic stand-ins for the compute module.
//!
//! [`StubGuest`] implements the guest ABI over a plain `Vec<u8>` with the
//! same bump allocator the real module uses, so marshaling can be tested
//! without compiling or instantiating any WebAssembly. The entry point is a
//! closure; the constructors cover the output shapes the decoder must
//! handle.
//!
//! # Example
//!
//! ```
//! use txt2svg_core::marshal::{Marshaler, ModuleInstance};
//! use txt2svg_core::testing::StubGuest;
//!
//! let mut instance = ModuleInstance::new(StubGuest::new(128 * 1024));
//! let svg = Marshaler::default()
//!     .generate(&mut instance, "Hi", b"font", "ff0000")
//!     .unwrap();
//! assert!(svg.as_str().contains("fill='#ff0000'"));
//! ```

use crate::error::{Result, Txt2SvgError};
use crate::guest::{GenerateCall, GuestFactory, GuestModule};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Offset the stub allocator rewinds to.
pub const DEFAULT_HEAP_BASE: u32 = 256;

/// Entry point implementation: receives the whole linear memory.
pub type ComputeFn = Box<dyn FnMut(&mut [u8], GenerateCall) -> i32 + Send>;

/// Counters recorded by a [`StubGuest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuestStats {
    /// `reset_heap` calls.
    pub resets: u32,
    /// `alloc` calls.
    pub allocations: u32,
    /// `generate_svg` calls.
    pub generate_calls: u32,
}

impl GuestStats {
    /// Check if the guest was never touched.
    pub fn is_untouched(&self) -> bool {
        *self == Self::default()
    }
}

/// In-memory guest with a bump allocator and a pluggable entry point.
pub struct StubGuest {
    memory: Vec<u8>,
    heap_base: u32,
    heap_ptr: u32,
    compute: ComputeFn,
    stats: GuestStats,
    last_call: Option<GenerateCall>,
    trap_on_generate: bool,
}

impl StubGuest {
    /// Create a stub whose entry point echoes its inputs as an SVG.
    ///
    /// The output is `<svg ...><text fill='COLOR'>TEXT</text></svg>`,
    /// NUL-terminated when it fits. An empty font yields a return of 0 and
    /// no output, like the real module rejecting an unparsable font.
    pub fn new(memory_size: usize) -> Self {
        Self::with_compute(memory_size, Box::new(echo_svg))
    }

    /// Create a stub with a custom entry point.
    pub fn with_compute(memory_size: usize, compute: ComputeFn) -> Self {
        Self {
            memory: vec![0; memory_size],
            heap_base: DEFAULT_HEAP_BASE,
            heap_ptr: 0,
            compute,
            stats: GuestStats::default(),
            last_call: None,
            trap_on_generate: false,
        }
    }

    /// Entry point writes `output` plus a terminator when there is room.
    pub fn terminated(memory_size: usize, output: &[u8]) -> Self {
        let output = output.to_vec();
        Self::with_compute(
            memory_size,
            Box::new(move |memory, call| write_output(memory, call, &output, true)),
        )
    }

    /// Entry point writes `output` without a terminator.
    pub fn exact_fill(memory_size: usize, output: &[u8]) -> Self {
        let output = output.to_vec();
        Self::with_compute(
            memory_size,
            Box::new(move |memory, call| write_output(memory, call, &output, false)),
        )
    }

    /// Entry point fills the output region with non-zero bytes and returns
    /// `result`.
    pub fn scribbling(memory_size: usize, result: i32) -> Self {
        Self::with_compute(
            memory_size,
            Box::new(move |memory, call| {
                let start = call.out_ptr as usize;
                let end = start + call.out_capacity as usize;
                memory[start..end].fill(b'x');
                result
            }),
        )
    }

    /// Make every generate call fail as a trap would.
    pub fn trapping(mut self) -> Self {
        self.trap_on_generate = true;
        self
    }

    /// Get the allocator's base offset.
    pub fn heap_base(&self) -> u32 {
        self.heap_base
    }

    /// Get the call counters.
    pub fn stats(&self) -> GuestStats {
        self.stats
    }

    /// Get the arguments of the most recent generate call.
    pub fn last_call(&self) -> Option<GenerateCall> {
        self.last_call
    }
}

impl GuestModule for StubGuest {
    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    fn reset_heap(&mut self) -> Result<()> {
        self.stats.resets += 1;
        self.heap_ptr = self.heap_base;
        Ok(())
    }

    fn alloc(&mut self, size: u32) -> Result<u32> {
        self.stats.allocations += 1;
        let ptr = self.heap_ptr;
        self.heap_ptr = self.heap_ptr.wrapping_add(size);
        Ok(ptr)
    }

    fn generate_svg(&mut self, call: GenerateCall) -> Result<i32> {
        self.stats.generate_calls += 1;
        self.last_call = Some(call);
        if self.trap_on_generate {
            return Err(Txt2SvgError::WasmExecution {
                function: "wasm_generate_svg",
                cause: "wasm trap: unreachable".to_string(),
            });
        }
        Ok((self.compute)(&mut self.memory, call))
    }
}

/// Factory producing stubs from a closure and counting instantiations.
#[derive(Clone)]
pub struct StubFactory {
    make: Arc<dyn Fn() -> StubGuest + Send + Sync>,
    instantiations: Arc<AtomicU64>,
}

impl StubFactory {
    /// Create a factory.
    pub fn new(make: impl Fn() -> StubGuest + Send + Sync + 'static) -> Self {
        Self {
            make: Arc::new(make),
            instantiations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the number of guests created so far.
    pub fn instantiations(&self) -> u64 {
        self.instantiations.load(Ordering::SeqCst)
    }
}

impl GuestFactory for StubFactory {
    type Guest = StubGuest;

    fn instantiate(&self) -> Result<StubGuest> {
        self.instantiations.fetch_add(1, Ordering::SeqCst);
        Ok((self.make)())
    }
}

/// Read a NUL-terminated byte string starting at `ptr`.
pub fn read_cstr(memory: &[u8], ptr: u32) -> &[u8] {
    let tail = &memory[ptr as usize..];
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    &tail[..end]
}

fn echo_svg(memory: &mut [u8], call: GenerateCall) -> i32 {
    if call.font_len == 0 {
        return 0;
    }
    let text = String::from_utf8_lossy(read_cstr(memory, call.text_ptr)).into_owned();
    let color = String::from_utf8_lossy(read_cstr(memory, call.color_ptr)).into_owned();
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg'><text fill='{}'>{}</text></svg>",
        color, text
    );
    write_output(memory, call, svg.as_bytes(), true)
}

fn write_output(memory: &mut [u8], call: GenerateCall, output: &[u8], terminate: bool) -> i32 {
    let start = call.out_ptr as usize;
    let capacity = call.out_capacity as usize;
    let len = output.len().min(capacity);
    memory[start..start + len].copy_from_slice(&output[..len]);
    if terminate && len < capacity {
        memory[start + len] = 0;
    }
    len as i32
}
