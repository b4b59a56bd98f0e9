use std::collections::HashSet;
use std::net::IpAddr;

use autofilter_application::ports::ReloadSignalPort;
use tracing::warn;

const COOLDOWN_SECS: i64 = 60;

/// Tracks the reload cooldown and last-published address set described in
/// §4.H. One controller instance lives for the whole daemon run.
pub struct ReloadController {
    last_reload_epoch: i64,
    last_published_set: HashSet<IpAddr>,
}

impl ReloadController {
    pub fn new() -> Self {
        Self {
            last_reload_epoch: 0,
            last_published_set: HashSet::new(),
        }
    }

    /// Signals the fronting server iff the cooldown has elapsed and the
    /// address set changed since the last successful signal. Bookkeeping
    /// only advances when the signal is actually delivered, so a skipped
    /// signal (missing PID file) is retried on the next call.
    pub async fn maybe_signal(
        &mut self,
        current_set: HashSet<IpAddr>,
        now: i64,
        signal: &dyn ReloadSignalPort,
    ) {
        if now - self.last_reload_epoch < COOLDOWN_SECS {
            return;
        }
        if current_set == self.last_published_set {
            return;
        }

        match signal.signal().await {
            Ok(true) => {
                self.last_reload_epoch = now;
                self.last_published_set = current_set;
            }
            Ok(false) => {
                // Skipped (no PID file yet); retry on the next window close.
            }
            Err(err) => {
                warn!(error = %err, "reload signal failed");
            }
        }
    }
}

impl Default for ReloadController {
    fn default() -> Self {
        Self::new()
    }
}
