//! Prelude for convenient imports.
//!
//! ```ignore
//! use txt2svg_core::prelude::*;
//! ```

pub use crate::arena::{Arena, ArenaSlot};
pub use crate::error::{Result, Txt2SvgError};
pub use crate::font::FontKey;
pub use crate::guest::{GenerateCall, GuestFactory, GuestModule};
pub use crate::host::{HostStats, InstancePolicy, ModuleHost, SvgGenerator};
pub use crate::marshal::{
    DEFAULT_OUTPUT_CAPACITY, DecodedOutput, MarshalConfig, Marshaler, ModuleInstance,
};
pub use crate::request::{Color, DEFAULT_COLOR, DEFAULT_FONT, DEFAULT_TEXT, RenderRequest};
