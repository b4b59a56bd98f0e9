//! Argument parsing (§6 External Interfaces: CLI).

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_CONFIG_PATH: &str = "/opt/autofilter/autofilter.conf";
pub const DEFAULT_ACCESS_LOG_PATH: &str = "/var/log/nginx/access.log";
pub const DEFAULT_BOT_FILE_PATH: &str = "/opt/autofilter/var/bot.conf";
pub const DEFAULT_PID_FILE_PATH: &str = "/var/run/nginx.pid";
pub const DEFAULT_LOG_FILE_PATH: &str = "/opt/autofilter/var/autofilter.log";
pub const DEFAULT_DNS_SERVER: &str = "127.0.0.1:53";

/// Automatic layer-7 DDoS mitigation daemon: tails an access log, blocks
/// abusive clients via a bot artifact consumed by the fronting HTTP server.
#[derive(Parser, Debug)]
#[command(name = "autofilter", version, about, long_about = None)]
pub struct Cli {
    /// Detect and log, but do not persist the bot artifact or signal reload.
    #[arg(short = 'n', long = "dry-run", conflicts_with = "test_config")]
    pub dry_run: bool,

    /// Parse the config file, print success or failure, and exit.
    #[arg(short = 't', long = "test-config", conflicts_with = "dry_run")]
    pub test_config: bool,

    /// Config file path (§4.A); absence is not an error.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Access log to tail (§4.D, §6).
    #[arg(long, default_value = DEFAULT_ACCESS_LOG_PATH)]
    pub access_log: PathBuf,

    /// Bot artifact path consumed by the fronting server (§4.G, §6).
    #[arg(long, default_value = DEFAULT_BOT_FILE_PATH)]
    pub bot_file: PathBuf,

    /// PID file of the fronting server's master process (§6).
    #[arg(long, default_value = DEFAULT_PID_FILE_PATH)]
    pub pid_file: PathBuf,

    /// Rotating diagnostics log file (§6).
    #[arg(long, default_value = DEFAULT_LOG_FILE_PATH)]
    pub log_file: PathBuf,

    /// Recursive resolver used for FCrDNS (§1, §4.C).
    #[arg(long, default_value = DEFAULT_DNS_SERVER)]
    pub dns_server: SocketAddr,

    /// Enable the optional warm-up routine that discards log lines more
    /// than two minutes stale on startup (§4.D; disabled by default, §9).
    #[arg(long)]
    pub warmup_discard_stale: bool,
}
