//! Marshaling between host values and guest linear memory.
//!
//! One [`Marshaler::generate`] call is one critical section on a module
//! instance:
//!
//! ```text
//! reset ─▶ encode text\0, color\0, font bytes ─▶ alloc output ─▶ call ─▶ decode
//! ```
//!
//! The reset comes first, never last, so no call observes allocations left
//! by the previous one, including allocations the guest made internally
//! while parsing the previous font. Callers that share an instance across
//! threads must hold a lock for the whole sequence; see [`crate::host`].

mod decode;

pub use decode::DecodedOutput;

use crate::arena::Arena;
use crate::error::Result;
use crate::guest::{GenerateCall, GuestModule};
use crate::request::Color;

/// Default capacity of the output region (64 KiB).
pub const DEFAULT_OUTPUT_CAPACITY: u32 = 64 * 1024;

/// Configuration for the marshaler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalConfig {
    /// Bytes reserved for the entry point's output.
    ///
    /// Output longer than this is truncated; see
    /// [`DecodedOutput::is_truncated`].
    pub output_capacity: u32,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
        }
    }
}

impl MarshalConfig {
    /// Set the output capacity.
    pub fn with_output_capacity(mut self, capacity: u32) -> Self {
        self.output_capacity = capacity;
        self
    }
}

/// A guest together with the arena ledger that tracks its allocator.
pub struct ModuleInstance<G> {
    guest: G,
    arena: Arena,
    calls: u64,
}

impl<G: GuestModule> ModuleInstance<G> {
    /// Wrap a freshly instantiated guest.
    pub fn new(guest: G) -> Self {
        Self {
            guest,
            arena: Arena::new(),
            calls: 0,
        }
    }

    /// Get the guest.
    pub fn guest(&self) -> &G {
        &self.guest
    }

    /// Get the arena ledger.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Get the number of generate calls made on this instance.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

/// Encodes inputs into a guest, calls the entry point and decodes the result.
#[derive(Debug, Clone, Default)]
pub struct Marshaler {
    config: MarshalConfig,
}

impl Marshaler {
    /// Create a marshaler with the given configuration.
    pub fn new(config: MarshalConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MarshalConfig {
        &self.config
    }

    /// Run one reset, encode, call, decode sequence.
    ///
    /// Returns `DecodedOutput::Empty` (or an empty terminated string) when
    /// the entry point fails; errors are reserved for arena and guest
    /// faults, after which the instance must not be reused.
    pub fn generate<G: GuestModule>(
        &self,
        instance: &mut ModuleInstance<G>,
        text: &str,
        font: &[u8],
        color: &str,
    ) -> Result<DecodedOutput> {
        let ModuleInstance {
            guest,
            arena,
            calls,
        } = instance;
        *calls += 1;

        arena.reset(guest)?;

        let color = Color::normalize(color);
        let text_slot = arena.alloc_cstr(guest, text)?;
        let color_slot = arena.alloc_cstr(guest, color.as_str())?;
        let font_slot = arena.alloc_bytes(guest, font)?;
        let out_slot = arena.allocate(guest, self.config.output_capacity)?;
        // An entry point that fails without writing must not expose the
        // output of an earlier call at the same offset.
        arena.fill(guest, out_slot, 0)?;

        let call = GenerateCall {
            text_ptr: text_slot.offset(),
            font_ptr: font_slot.offset(),
            font_len: font_slot.len(),
            color_ptr: color_slot.offset(),
            out_ptr: out_slot.offset(),
            out_capacity: out_slot.len(),
        };
        let result_length = guest.generate_svg(call)?;

        let region = arena.read(guest, out_slot)?;
        let decoded = DecodedOutput::decode(region, result_length);

        tracing::debug!(
            epoch = arena.epoch(),
            text_len = text.len(),
            font_len = font.len(),
            result_length,
            decoded = decoded.kind(),
            svg_len = decoded.as_str().len(),
            "Generate call finished"
        );
        if decoded.is_truncated() {
            tracing::warn!(
                capacity = self.config.output_capacity,
                result_length,
                "SVG output filled the output region and may be truncated"
            );
        }

        Ok(decoded)
    }
}
