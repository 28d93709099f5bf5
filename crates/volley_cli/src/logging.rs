//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so they never mix with the scoreboard on stdout.
//! `log` records from `volley_core` are forwarded into the same subscriber.
//!
//! # Log Levels
//!
//! - `warn`: rejected operations, unreadable saves (default)
//! - `info`: set and match results, saves, migrations (`-v`)
//! - `debug`: rotations, byte counts, command dispatch (`-vv`)
//! - `trace`: everything (`-vvv`)

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Include the module path in each line.
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: Level::WARN, with_target: false, with_ansi: true }
    }
}

impl LogConfig {
    /// Create a `LogConfig` from the `-v` count.
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self { level, with_target: verbosity >= 2, ..Default::default() }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    tracing_subscriber::registry().with(build_env_filter(config.level)).with(layer).try_init()
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()))
}
