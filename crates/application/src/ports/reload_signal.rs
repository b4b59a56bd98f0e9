use async_trait::async_trait;
use autofilter_domain::AutofilterError;

/// Sends the fronting server's reload signal (§4.H). A missing or
/// unreadable PID file is not an error at this layer: implementations
/// return `Ok(false)` so the caller knows delivery was skipped and should
/// retry on the next window close (§7), without disturbing its cooldown
/// bookkeeping.
#[async_trait]
pub trait ReloadSignalPort: Send + Sync {
    /// Returns `Ok(true)` if the signal was actually delivered, `Ok(false)`
    /// if it was silently skipped (e.g. no PID file yet).
    async fn signal(&self) -> Result<bool, AutofilterError>;
}
