//! `autofilter`: automatic layer-7 DDoS mitigation daemon (§1, §6).
//!
//! Bootstraps logging and configuration, wires the infrastructure adapters
//! behind the application ports, and runs the single cooperative
//! tail-aggregate-detect-persist-signal loop described in §5 until a
//! termination signal arrives.

mod bootstrap;
mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::info;

use autofilter_infrastructure::{FcrdnsVerifier, FileBotStore, InodeTailer, PidFileReloadSignal};
use autofilter_jobs::AutofilterDaemon;

use crate::bootstrap::config::{check_config, load_tables, ConfigCheck};
use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.test_config {
        bootstrap::logging::init_config_diagnostics_logging();
        return run_test_config(&cli).await;
    }

    let _log_guard = match bootstrap::init_logging(&cli.log_file) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to open {}: {err}", cli.log_file.display());
            return ExitCode::FAILURE;
        }
    };

    let tables = load_tables(&cli.config).await;

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let log_source = Box::new(InodeTailer::new(
        cli.access_log.clone(),
        cli.warmup_discard_stale,
    ));
    let reverse_dns = Arc::new(FcrdnsVerifier::with_nameserver(cli.dns_server));
    let bot_store = Arc::new(FileBotStore::new(cli.bot_file.clone()));
    let reload_signal = Arc::new(PidFileReloadSignal::new(cli.pid_file.clone()));

    info!(
        access_log = %cli.access_log.display(),
        bot_file = %cli.bot_file.display(),
        pid_file = %cli.pid_file.display(),
        dry_run = cli.dry_run,
        "autofilter starting"
    );

    let daemon = AutofilterDaemon::new(
        log_source,
        reverse_dns,
        bot_store,
        reload_signal,
        tables,
        cli.dry_run,
        shutdown,
    );
    daemon.run().await;

    info!("autofilter exiting");
    ExitCode::SUCCESS
}

/// `-t/--test-config`: parse the config file, print success or failure,
/// exit 0/1 (§6). Never touches the access log, bot artifact, or PID file.
async fn run_test_config(cli: &Cli) -> ExitCode {
    match check_config(&cli.config).await {
        ConfigCheck::Ok => {
            println!("config OK: {}", cli.config.display());
            ExitCode::SUCCESS
        }
        ConfigCheck::Missing => {
            println!(
                "no config file at {}, built-in defaults apply",
                cli.config.display()
            );
            ExitCode::SUCCESS
        }
        ConfigCheck::ParseFailed(reason) => {
            eprintln!("config FAILED: {}: {reason}", cli.config.display());
            ExitCode::FAILURE
        }
    }
}

/// Flips `shutdown` on SIGINT or SIGTERM (§5, §6): the tailer observes the
/// token between every read and every sleep and exits cleanly.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGINT handler");
                return;
            }
        };
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
        shutdown.cancel();
    });
}
