//! Configuration types for observability.

use std::env;
use std::str::FromStr;

/// Service name used when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "txt2svg";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON format for structured logging.
    Json,
    /// Human-readable pretty format with colors.
    Pretty,
    /// Compact single-line format.
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::default(),
        })
    }
}

impl LogFormat {
    /// Get the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

/// Configuration for tracing and observability.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name for traces and logs.
    service_name: String,
    /// Log output format.
    log_format: LogFormat,
    /// Log level filter (e.g., "info", "debug,txt2svg_core=trace").
    log_filter: String,
    /// Whether to include source location in logs.
    include_location: bool,
    /// Whether to include target in logs.
    include_target: bool,
    /// Whether to include thread names in logs.
    include_thread_names: bool,
    /// Whether to include thread IDs in logs.
    include_thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_format: LogFormat::default(),
            log_filter: "info".to_string(),
            include_location: false,
            include_target: true,
            include_thread_names: false,
            include_thread_ids: false,
        }
    }
}

impl TracingConfig {
    /// Create a new builder.
    pub fn builder() -> TracingConfigBuilder {
        TracingConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TXT2SVG_LOG_FORMAT`: "json", "pretty", or "compact"
    /// - `TXT2SVG_LOG_LEVEL` or `RUST_LOG`: Log filter string
    /// - `TXT2SVG_SERVICE_NAME`: Service name (defaults to "txt2svg")
    /// - `TXT2SVG_LOG_LOCATION`, `TXT2SVG_LOG_THREAD_NAMES`,
    ///   `TXT2SVG_LOG_THREAD_IDS`: "true" or "1" to enable
    pub fn from_env() -> Self {
        let log_format = env::var("TXT2SVG_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse::<LogFormat>().ok())
            .unwrap_or_else(|| {
                // Auto-detect: JSON for non-TTY, pretty for TTY
                if atty_check() {
                    LogFormat::Pretty
                } else {
                    LogFormat::Json
                }
            });

        let log_filter = env::var("TXT2SVG_LOG_LEVEL")
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        let service_name = env::var("TXT2SVG_SERVICE_NAME")
            .unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

        Self {
            service_name,
            log_format,
            log_filter,
            include_location: env_flag("TXT2SVG_LOG_LOCATION"),
            include_target: true,
            include_thread_names: env_flag("TXT2SVG_LOG_THREAD_NAMES"),
            include_thread_ids: env_flag("TXT2SVG_LOG_THREAD_IDS"),
        }
    }

    /// Turn this configuration back into a builder for further overrides.
    pub fn into_builder(self) -> TracingConfigBuilder {
        TracingConfigBuilder {
            service_name: Some(self.service_name),
            log_format: Some(self.log_format),
            log_filter: Some(self.log_filter),
            include_location: Some(self.include_location),
            include_target: Some(self.include_target),
            include_thread_names: Some(self.include_thread_names),
            include_thread_ids: Some(self.include_thread_ids),
        }
    }

    /// Get the service name.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Get the log format.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Get the log filter.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Check if source location should be included.
    pub fn include_location(&self) -> bool {
        self.include_location
    }

    /// Check if target should be included.
    pub fn include_target(&self) -> bool {
        self.include_target
    }

    /// Check if thread names should be included.
    pub fn include_thread_names(&self) -> bool {
        self.include_thread_names
    }

    /// Check if thread IDs should be included.
    pub fn include_thread_ids(&self) -> bool {
        self.include_thread_ids
    }
}

/// Builder for TracingConfig.
#[derive(Debug, Clone, Default)]
pub struct TracingConfigBuilder {
    service_name: Option<String>,
    log_format: Option<LogFormat>,
    log_filter: Option<String>,
    include_location: Option<bool>,
    include_target: Option<bool>,
    include_thread_names: Option<bool>,
    include_thread_ids: Option<bool>,
}

impl TracingConfigBuilder {
    /// Set the service name.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Set the log format.
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Set the log filter.
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Raise the filter for `-v` flags: 1 is `debug`, 2 or more is `trace`.
    ///
    /// Zero leaves the filter as configured.
    pub fn verbosity(mut self, level: u8) -> Self {
        match level {
            0 => {}
            1 => self.log_filter = Some("debug".to_string()),
            _ => self.log_filter = Some("trace".to_string()),
        }
        self
    }

    /// Include source location in logs.
    pub fn include_location(mut self, include: bool) -> Self {
        self.include_location = Some(include);
        self
    }

    /// Include target in logs.
    pub fn include_target(mut self, include: bool) -> Self {
        self.include_target = Some(include);
        self
    }

    /// Include thread names in logs.
    pub fn include_thread_names(mut self, include: bool) -> Self {
        self.include_thread_names = Some(include);
        self
    }

    /// Include thread IDs in logs.
    pub fn include_thread_ids(mut self, include: bool) -> Self {
        self.include_thread_ids = Some(include);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TracingConfig {
        let defaults = TracingConfig::default();
        TracingConfig {
            service_name: self.service_name.unwrap_or(defaults.service_name),
            log_format: self.log_format.unwrap_or(defaults.log_format),
            log_filter: self.log_filter.unwrap_or(defaults.log_filter),
            include_location: self.include_location.unwrap_or(defaults.include_location),
            include_target: self.include_target.unwrap_or(defaults.include_target),
            include_thread_names: self
                .include_thread_names
                .unwrap_or(defaults.include_thread_names),
            include_thread_ids: self
                .include_thread_ids
                .unwrap_or(defaults.include_thread_ids),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
        .unwrap_or(false)
}

/// Check if stderr is a TTY.
fn atty_check() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}
