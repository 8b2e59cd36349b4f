//! Error types for txt2svg.
//!
//! Every variant carries a stable code (`E101`, `E702`, ...) in its display
//! string so that log lines can be grepped by failure class. None of the
//! variants carry raw linear-memory contents; offsets appear only in
//! diagnostics that stay server-side.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for txt2svg operations.
#[derive(Error, Debug)]
pub enum Txt2SvgError {
    // =========================================================================
    // Validation Errors (E100-E199)
    // =========================================================================
    /// The requested font key is not in the supported set.
    #[error("E101: Unsupported font: {key}")]
    UnsupportedFont {
        /// The (lowercased) key that was requested.
        key: String,
    },

    // =========================================================================
    // Asset Errors (E200-E299)
    // =========================================================================
    /// The asset store could not produce the requested asset.
    #[error("E201: Failed to fetch asset '{path}': {cause}")]
    AssetFetch {
        /// Store-relative asset path.
        path: String,
        /// Reason for the failure.
        cause: String,
    },

    /// A font asset was fetched but contained no bytes.
    #[error("E202: Font asset '{path}' is empty")]
    EmptyFontAsset {
        /// Store-relative asset path.
        path: String,
    },

    /// The asset store has no asset at the path.
    #[error("E204: Asset '{path}' not found")]
    AssetNotFound {
        /// Store-relative asset path.
        path: String,
    },

    /// An asset path was rejected before touching the store.
    #[error("E203: Asset path '{path}' rejected: {cause}")]
    AssetPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        cause: String,
    },

    // =========================================================================
    // Arena Errors (E300-E399)
    // =========================================================================
    /// An allocation does not fit in the guest's linear memory.
    #[error(
        "E301: Arena exhausted: {requested} bytes at offset {offset} exceed linear memory of {memory_size} bytes"
    )]
    ArenaExhausted {
        /// Number of bytes requested.
        requested: u32,
        /// Offset the guest allocator returned.
        offset: u32,
        /// Current size of linear memory.
        memory_size: usize,
    },

    /// A slot from an earlier epoch was used after a reset.
    #[error("E302: Stale arena slot from epoch {slot_epoch} used in epoch {current_epoch}")]
    StaleSlot {
        /// Epoch the slot was allocated in.
        slot_epoch: u64,
        /// Current arena epoch.
        current_epoch: u64,
    },

    // =========================================================================
    // Generation Errors (E400-E499)
    // =========================================================================
    /// The compute entry point produced no output.
    #[error("E401: Generated SVG is empty")]
    GenerationEmpty,

    // =========================================================================
    // Module Errors (E700-E799)
    // =========================================================================
    /// The WebAssembly module could not be compiled or instantiated.
    #[error("E701: Failed to load WASM module '{module}': {cause}")]
    WasmLoad {
        /// Module name or path.
        module: String,
        /// Reason for the load failure.
        cause: String,
    },

    /// A call into the guest trapped or otherwise failed.
    #[error("E702: WASM call '{function}' failed: {cause}")]
    WasmExecution {
        /// Exported function being called.
        function: &'static str,
        /// Reason for the failure.
        cause: String,
    },

    /// A required export is missing or has the wrong signature.
    #[error("E703: WASM export '{name}' unavailable: {cause}")]
    WasmExport {
        /// Export name.
        name: &'static str,
        /// Reason it could not be resolved.
        cause: String,
    },

    /// A guest call exceeded its time budget.
    #[error("E704: WASM call '{function}' exceeded its {timeout_ms}ms budget")]
    WasmTimeout {
        /// Exported function being called.
        function: &'static str,
        /// Configured budget.
        timeout_ms: u64,
    },

    // =========================================================================
    // Configuration Errors (E800-E899)
    // =========================================================================
    /// Invalid configuration value.
    #[error("E801: Invalid configuration for '{field}': {cause}")]
    ConfigValue {
        /// The configuration field.
        field: String,
        /// Why the value is invalid.
        cause: String,
    },

    // =========================================================================
    // I/O Errors (E900-E999)
    // =========================================================================
    /// Filesystem I/O failed.
    #[error("E901: I/O error at {path}: {cause}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Reason for the failure.
        cause: String,
    },

    /// Network I/O failed.
    #[error("E902: Network error: {cause}")]
    Network {
        /// Reason for the failure.
        cause: String,
    },
}

impl Txt2SvgError {
    /// Get the error code (e.g., "E101").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFont { .. } => "E101",
            Self::AssetFetch { .. } => "E201",
            Self::EmptyFontAsset { .. } => "E202",
            Self::AssetPath { .. } => "E203",
            Self::AssetNotFound { .. } => "E204",
            Self::ArenaExhausted { .. } => "E301",
            Self::StaleSlot { .. } => "E302",
            Self::GenerationEmpty => "E401",
            Self::WasmLoad { .. } => "E701",
            Self::WasmExecution { .. } => "E702",
            Self::WasmExport { .. } => "E703",
            Self::WasmTimeout { .. } => "E704",
            Self::ConfigValue { .. } => "E801",
            Self::Io { .. } => "E901",
            Self::Network { .. } => "E902",
        }
    }

    /// Check if this error is caused by the caller's input.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::UnsupportedFont { .. })
    }

    /// Check if this error leaves a module instance in an unknown state.
    ///
    /// An instance that raised one of these must not be reused: its bump
    /// pointer and output buffer may be in any state.
    #[must_use]
    pub fn poisons_instance(&self) -> bool {
        matches!(
            self,
            Self::ArenaExhausted { .. }
                | Self::StaleSlot { .. }
                | Self::WasmExecution { .. }
                | Self::WasmTimeout { .. }
        )
    }
}

/// Result type alias using `Txt2SvgError`.
pub type Result<T> = std::result::Result<T, Txt2SvgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_correct() {
        let err = Txt2SvgError::UnsupportedFont {
            key: "comic".to_string(),
        };
        assert_eq!(err.code(), "E101");

        let err = Txt2SvgError::StaleSlot {
            slot_epoch: 1,
            current_epoch: 2,
        };
        assert_eq!(err.code(), "E302");

        assert_eq!(Txt2SvgError::GenerationEmpty.code(), "E401");
    }

    #[test]
    fn error_display() {
        let err = Txt2SvgError::UnsupportedFont {
            key: "nonexistent".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("E101"));
        assert!(msg.contains("Unsupported font: nonexistent"));

        let err = Txt2SvgError::WasmTimeout {
            function: "wasm_generate_svg",
            timeout_ms: 250,
        };
        let msg = err.to_string();
        assert!(msg.contains("wasm_generate_svg"));
        assert!(msg.contains("250ms"));
    }

    #[test]
    fn poisoning_classification() {
        assert!(
            Txt2SvgError::WasmExecution {
                function: "wasm_alloc",
                cause: "unreachable".to_string(),
            }
            .poisons_instance()
        );
        assert!(
            Txt2SvgError::ArenaExhausted {
                requested: 65536,
                offset: 8_000_000,
                memory_size: 8_388_608,
            }
            .poisons_instance()
        );
        assert!(!Txt2SvgError::GenerationEmpty.poisons_instance());
        assert!(
            !Txt2SvgError::UnsupportedFont {
                key: "x".to_string()
            }
            .poisons_instance()
        );
    }

    #[test]
    fn validation_classification() {
        assert!(
            Txt2SvgError::UnsupportedFont {
                key: "x".to_string()
            }
            .is_validation_error()
        );
        assert!(
            !Txt2SvgError::AssetFetch {
                path: "fonts/Roboto.ttf".to_string(),
                cause: "not found".to_string(),
            }
            .is_validation_error()
        );
    }
}
