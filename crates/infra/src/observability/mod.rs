//! Tracing subscriber setup
//!
//! Libraries only emit `tracing` events; binaries and tests decide where they
//! go. `RUST_LOG` overrides the filter passed in.

use tracing_subscriber::{fmt, EnvFilter};

/// Output format for [`init_tracing_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install a global fmt subscriber filtered by `RUST_LOG` or `default_filter`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    init_tracing_with(default_filter, LogFormat::Pretty)
}

pub fn init_tracing_with(default_filter: &str, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}
