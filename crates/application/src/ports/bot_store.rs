use async_trait::async_trait;
use autofilter_domain::{AutofilterError, BotSet};

/// Application-layer port for the persistent bot artifact (§4.G).
/// Implementations own the filesystem path and the atomic-rename discipline;
/// this port only exposes the load/persist round trip.
#[async_trait]
pub trait BotStorePort: Send + Sync {
    /// Read and parse the artifact, dropping entries already expired
    /// relative to `now`. A missing artifact is treated as an empty set.
    async fn load(&self, now: i64) -> Result<BotSet, AutofilterError>;

    /// Atomically replace the artifact with the serialized contents of
    /// `set`.
    async fn persist(&self, set: &BotSet) -> Result<(), AutofilterError>;
}
