//! Diagnostic logging through `tracing`.
//!
//! Logs go to stderr so that stdout stays reserved for user-facing output
//! (including the JSON report). `RUST_LOG` overrides the level picked from `-v`/`-q`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map the CLI verbosity onto a log level. Quiet mode only reports errors.
pub fn level_for_verbosity(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Calling it twice is harmless; the second call is ignored.
pub fn init_logging(level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scorewd={}", level)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
