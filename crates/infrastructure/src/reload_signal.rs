use std::path::PathBuf;

use async_trait::async_trait;
use autofilter_application::ports::ReloadSignalPort;
use autofilter_domain::AutofilterError;
use tracing::{debug, warn};

/// Sends SIGHUP to the fronting server's master process, whose PID is read
/// from a conventional PID file on every call (§6, §4.H). A missing or
/// unparsable PID file is not treated as an error: the caller retries on
/// the next window close.
pub struct PidFileReloadSignal {
    pid_path: PathBuf,
}

impl PidFileReloadSignal {
    pub fn new(pid_path: PathBuf) -> Self {
        Self { pid_path }
    }

    fn parse_pid(text: &str) -> Option<libc::pid_t> {
        text.lines().next()?.trim().parse().ok()
    }
}

#[async_trait]
impl ReloadSignalPort for PidFileReloadSignal {
    async fn signal(&self) -> Result<bool, AutofilterError> {
        let text = match tokio::fs::read_to_string(&self.pid_path).await {
            Ok(text) => text,
            Err(err) => {
                debug!(
                    path = %self.pid_path.display(),
                    error = %err,
                    "PID file missing or unreadable, skipping reload signal"
                );
                return Ok(false);
            }
        };

        let Some(pid) = Self::parse_pid(&text) else {
            warn!(path = %self.pid_path.display(), "PID file contents not a valid PID, skipping reload signal");
            return Ok(false);
        };

        // SAFETY: `kill` with a signal is always safe to call; its only
        // effect is delivering SIGHUP to an existing process or failing
        // with ESRCH, which we treat as a skip rather than an error.
        let result = unsafe { libc::kill(pid, libc::SIGHUP) };
        if result != 0 {
            let err = std::io::Error::last_os_error();
            debug!(pid, error = %err, "SIGHUP delivery failed, skipping this cycle");
            Ok(false)
        } else {
            debug!(pid, "sent SIGHUP to fronting server");
            Ok(true)
        }
    }
}
