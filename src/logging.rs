// src/logging.rs

use std::fmt;

use clap::ValueEnum;
use tracing_subscriber::{fmt as fmt_layer, prelude::*, EnvFilter};

/// Verbosity of diagnostic output. Progress and summaries go to stdout regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// `RUST_LOG` when set and valid, otherwise `level` for this crate only.
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)))
}

/// Installs a compact stderr subscriber. Later calls are ignored.
pub fn init_logging(level: LogLevel) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            fmt_layer::layer()
                .compact()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
