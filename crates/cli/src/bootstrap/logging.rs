//! Wires the two sinks described in §6 "Logging": a size-rotating file for
//! the main diagnostics stream, and a plain stderr stream reserved for
//! configuration diagnostics (`-t/--test-config`, config parse failures).

use std::path::Path;

use autofilter_infrastructure::RotatingFileWriter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber against the size-rotating
/// file sink, via `tracing-appender`'s non-blocking writer so logging
/// never stalls the daemon's single cooperative loop on file I/O. Returns
/// the worker guard, which the caller must hold for the life of the
/// process — dropping it stops the background flush thread.
pub fn init_logging(log_file: &Path) -> anyhow::Result<WorkerGuard> {
    let file_writer = RotatingFileWriter::open(log_file)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_writer);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(guard)
}

/// Stderr-only fallback used by `-t/--test-config`, which never touches
/// the rotating file — operators running a config check expect the result
/// on their terminal, not buried in the daemon's log.
pub fn init_config_diagnostics_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .try_init();
}
