use async_trait::async_trait;
use autofilter_domain::AutofilterError;
use tokio_util::sync::CancellationToken;

/// Lazy sequence of access-log lines (§4.D). Implementations own polling
/// for the file to appear, rotation detection by inode change, and the
/// one-second retry sleep; this port only exposes the next line.
#[async_trait]
pub trait LogSource: Send {
    /// Block until the next line is available, the cancellation token
    /// fires, or shutdown is otherwise observed. Returns `Ok(None)` only
    /// when cancelled; under normal operation this never returns while the
    /// token is unset, since the tailer polls and sleeps internally.
    async fn next_line(
        &mut self,
        shutdown: &CancellationToken,
    ) -> Result<Option<String>, AutofilterError>;
}
