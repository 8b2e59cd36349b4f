//! Logging setup for txt2svg.
//!
//! # Configuration
//!
//! Logging format is controlled via `TXT2SVG_LOG_FORMAT`:
//! - `json` - Structured JSON output
//! - `pretty` - Human-readable multi-line output (default for a TTY)
//! - `compact` - Compact single-line format
//!
//! The filter comes from `TXT2SVG_LOG_LEVEL`, then `RUST_LOG`, then `info`.
//!
//! # Example
//!
//! ```no_run
//! use txt2svg_server::observability::{LogFormat, TracingConfig, init_tracing};
//!
//! let config = TracingConfig::builder()
//!     .log_format(LogFormat::Json)
//!     .log_filter("info,txt2svg_core=debug")
//!     .build();
//! init_tracing(config)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod config;
mod tracing_setup;

pub use config::{DEFAULT_SERVICE_NAME, LogFormat, TracingConfig, TracingConfigBuilder};
pub use tracing_setup::init_tracing;
