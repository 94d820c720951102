//! Logging setup for SchemaLens binaries and embedders.
//!
//! Log output goes to stderr so that JSON written to stdout stays clean.

use crate::Result;
use tracing_subscriber::EnvFilter;

/// Maps the verbosity flags onto a maximum log level.
///
/// `quiet` wins over any verbosity: only errors are shown.
pub fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG`, when set, overrides the level derived from `verbose` and
/// `quiet` (see [`level_for`]).
///
/// # Errors
/// Returns a configuration error if a global subscriber is already set
///
/// # Example
/// ```rust,no_run
/// use schemalens_core::logging::init_logging;
///
/// init_logging(1, false)?;
/// # Ok::<(), schemalens_core::ExtractorError>(())
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = level_for(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::ExtractorError::configuration(format!(
                "Failed to initialize logging: {}",
                e
            ))
        })?;

    Ok(())
}
