//! The guest module seam.
//!
//! A guest is one live module instance: a linear memory plus the three
//! exports the renderer relies on.
//!
//! ```text
//! wasm_reset_heap()                                    // rewind bump pointer
//! wasm_alloc(size: u32) -> u32                         // bump-allocate, no free
//! wasm_generate_svg(text, font, font_len,
//!                   color, out, out_max: u32) -> i32   // bytes written, <= 0 on failure
//! ```
//!
//! Production code uses the wasmtime-backed guest in `txt2svg-server`;
//! tests use [`crate::testing::StubGuest`], which implements the same ABI
//! over a plain byte vector.

use crate::error::Result;

/// Pointer arguments for one `wasm_generate_svg` call.
///
/// All pointers are offsets into the guest's linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateCall {
    /// NUL-terminated UTF-8 text.
    pub text_ptr: u32,
    /// Raw font bytes.
    pub font_ptr: u32,
    /// Length of the font buffer.
    pub font_len: u32,
    /// NUL-terminated color string.
    pub color_ptr: u32,
    /// Output buffer.
    pub out_ptr: u32,
    /// Capacity of the output buffer.
    pub out_capacity: u32,
}

/// One live instance of the compute module.
pub trait GuestModule: Send {
    /// View the guest's linear memory.
    fn memory(&self) -> &[u8];

    /// Mutably view the guest's linear memory.
    fn memory_mut(&mut self) -> &mut [u8];

    /// Rewind the guest allocator to its base offset.
    fn reset_heap(&mut self) -> Result<()>;

    /// Bump-allocate `size` bytes and return the offset.
    ///
    /// The guest performs no capacity check; callers validate the range.
    fn alloc(&mut self, size: u32) -> Result<u32>;

    /// Invoke the compute entry point.
    fn generate_svg(&mut self, call: GenerateCall) -> Result<i32>;
}

/// Creates guest instances.
pub trait GuestFactory: Send + Sync {
    /// The guest type this factory produces.
    type Guest: GuestModule;

    /// Instantiate a fresh guest with fresh linear memory.
    fn instantiate(&self) -> Result<Self::Guest>;
}
