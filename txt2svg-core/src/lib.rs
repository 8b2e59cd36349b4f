//! txt2svg Core Library
//!
//! This crate holds the host side of the txt2svg marshaling protocol: the
//! part of the renderer that moves request data into a sandboxed compute
//! module's linear memory and reads the generated SVG back out.
//!
//! # Key Components
//!
//! - **Guest**: the [`GuestModule`] seam over one module instance
//!   (linear memory, `wasm_alloc`, `wasm_reset_heap`, `wasm_generate_svg`)
//! - **Arena**: epoch-tagged ledger over the guest's bump allocator
//! - **Marshaler**: the reset, encode, call, decode sequence
//! - **Host**: instance ownership policy and fault handling
//! - **Request**: defaults, color normalization and the font catalog
//!
//! # Example
//!
//! ```
//! use txt2svg_core::prelude::*;
//! use txt2svg_core::testing::StubFactory;
//! use txt2svg_core::testing::StubGuest;
//!
//! let factory = StubFactory::new(|| StubGuest::new(128 * 1024));
//! let host = ModuleHost::new(factory, InstancePolicy::Shared, Marshaler::default());
//!
//! let svg = host.generate("Hello", b"font", "#000000").unwrap();
//! assert!(svg.as_str().starts_with("<svg"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod error;
pub mod font;
pub mod guest;
pub mod host;
pub mod marshal;
pub mod prelude;
pub mod request;
pub mod testing;

pub use arena::{Arena, ArenaSlot};
pub use error::{Result, Txt2SvgError};
pub use font::FontKey;
pub use guest::{GenerateCall, GuestFactory, GuestModule};
pub use host::{InstancePolicy, ModuleHost, SvgGenerator};
pub use marshal::{DecodedOutput, MarshalConfig, Marshaler, ModuleInstance};
pub use request::{Color, RenderRequest};
