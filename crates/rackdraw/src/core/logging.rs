//! Logging infrastructure for rack diagram processing
//!
//! Structured logging built on `tracing`. The loader reports every fallback
//! stage it passes through (`debug!` for expected misses, `warn!` for broken
//! assets), and the export pipeline wraps each format in a span, so a
//! `RUST_LOG` filter is usually the quickest way to see why a device came out
//! as a placeholder:
//!
//! ```bash
//! RUST_LOG="rackdraw::loader=debug" rackdraw render --category switches --key cisco-c9200l-24t-4g
//! RUST_LOG="info,rackdraw::export=trace" rackdraw export --scene rack.json --format pdf
//! ```
//!
//! # Log Formats
//!
//! - `compact`: single line, no targets (default)
//! - `pretty`: multi-line with file/line and span events
//! - `json`: one JSON object per event
//!
//! # Environment Variables
//!
//! - `RACKDRAW_LOG_LEVEL`: trace|debug|info|warn|error|off, or a full filter
//! - `RACKDRAW_LOG_FORMAT`: compact|pretty|json
//! - `RUST_LOG`: standard `tracing-subscriber` filter, wins over the level
//!
//! On wasm32 events go to the browser console through `tracing-wasm` and the
//! format argument is ignored.

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Resolve the effective level and format strings
///
/// Explicit arguments win, then `RACKDRAW_LOG_LEVEL` / `RACKDRAW_LOG_FORMAT`,
/// then `RUST_LOG` for the level, then `info` / `compact`.
pub fn resolve_settings(level: Option<&str>, format: Option<&str>) -> (String, String) {
    let log_level = level
        .map(|s| s.to_string())
        .or_else(|| std::env::var("RACKDRAW_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    let log_format = format
        .map(|s| s.to_string())
        .or_else(|| std::env::var("RACKDRAW_LOG_FORMAT").ok())
        .unwrap_or_else(|| "compact".to_string());

    (log_level, log_format)
}

/// Initialize the tracing subscriber with the given log level and format
///
/// Returns an error for an unknown format, or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let (log_level, log_format) = resolve_settings(level, format);

        // Validate the format before touching the global subscriber
        let format = LogFormat::from_str(&log_format)
            .map_err(|e| format!("Invalid log format: {}", e))?;

        let filter = if log_level == "off" {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let registry = Registry::default().with(filter);
        match format {
            LogFormat::Compact => registry
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_level(true)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init()?,
            LogFormat::Pretty => registry
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .try_init()?,
            LogFormat::Json => registry
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .json(),
                )
                .try_init()?,
        }

        Ok(())
    }
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
