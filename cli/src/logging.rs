//! Diagnostics for the `ecliptic` binary.
//!
//! Everything `tracing` emits goes to stderr; stdout carries only command
//! results so they can be piped (`ecliptic send ... | xargs ...`).
//! `RUST_LOG` takes precedence over the built-in directives.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "ecliptic=info,ecliptic_protocol=info";

/// How diagnostics are rendered on stderr.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

fn filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

/// Installs the global subscriber. Must run once, before any command.
pub fn init_logging(directives: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter(directives));
    let stderr = fmt::layer().with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => registry.with(stderr.with_target(false)).init(),
        LogFormat::Json => registry.with(stderr.json().with_current_span(false)).init(),
    }

    tracing::debug!(?format, "diagnostics enabled");
}
