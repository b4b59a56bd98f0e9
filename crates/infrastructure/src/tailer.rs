use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use autofilter_application::ports::LogSource;
use autofilter_domain::AutofilterError;
use chrono::Utc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const WARM_UP_MAX_AGE_SECS: i64 = 120;

/// Tails a growing access log by inode (§4.D). Polls for the file to
/// appear, detects rotation by comparing the open handle's inode against
/// the path's current inode on every empty read, and honors cooperative
/// shutdown between every read and every sleep.
pub struct InodeTailer {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    inode: Option<u64>,
    warm_up_enabled: bool,
    warm_up_done: bool,
}

impl InodeTailer {
    pub fn new(path: PathBuf, warm_up_enabled: bool) -> Self {
        Self {
            path,
            reader: None,
            inode: None,
            warm_up_enabled,
            // No warm-up work left to do once it's disabled.
            warm_up_done: !warm_up_enabled,
        }
    }

    async fn path_inode(&self) -> Option<u64> {
        tokio::fs::metadata(&self.path).await.ok().map(|m| m.ino())
    }

    async fn try_open(&self) -> Option<(File, u64)> {
        let file = File::open(&self.path).await.ok()?;
        let inode = file.metadata().await.ok()?.ino();
        Some((file, inode))
    }

    /// Sleeps for the poll interval, returning `true` if cancellation fired
    /// first so the caller can exit immediately rather than completing the
    /// sleep.
    async fn sleep_or_cancel(shutdown: &CancellationToken) -> bool {
        tokio::select! {
            _ = sleep(POLL_INTERVAL) => false,
            _ = shutdown.cancelled() => true,
        }
    }

    fn is_stale(line: &str) -> bool {
        let Some(time_field) = line.split('\t').next() else {
            return false;
        };
        let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(time_field) else {
            return false;
        };
        let age = Utc::now().signed_duration_since(parsed).num_seconds();
        age > WARM_UP_MAX_AGE_SECS
    }
}

#[async_trait]
impl LogSource for InodeTailer {
    async fn next_line(
        &mut self,
        shutdown: &CancellationToken,
    ) -> Result<Option<String>, AutofilterError> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(None);
            }

            if self.reader.is_none() {
                match self.try_open().await {
                    Some((file, inode)) => {
                        info!(path = %self.path.display(), "opened log file");
                        self.reader = Some(BufReader::new(file));
                        self.inode = Some(inode);
                    }
                    None => {
                        if Self::sleep_or_cancel(shutdown).await {
                            return Ok(None);
                        }
                        continue;
                    }
                }
            }

            let mut raw = String::new();
            let read = self
                .reader
                .as_mut()
                .expect("reader populated above")
                .read_line(&mut raw)
                .await
                .map_err(|err| AutofilterError::Io(format!("reading log: {err}")))?;

            if read == 0 {
                let current_inode = self.path_inode().await;
                if current_inode != self.inode {
                    debug!(path = %self.path.display(), "inode changed, reopening");
                    self.reader = None;
                    self.inode = None;
                    continue;
                }
                if Self::sleep_or_cancel(shutdown).await {
                    return Ok(None);
                }
                continue;
            }

            if raw.ends_with('\n') {
                raw.pop();
                if raw.ends_with('\r') {
                    raw.pop();
                }
            }

            if !self.warm_up_done {
                if Self::is_stale(&raw) {
                    continue;
                }
                self.warm_up_done = true;
            }

            return Ok(Some(raw));
        }
    }
}
