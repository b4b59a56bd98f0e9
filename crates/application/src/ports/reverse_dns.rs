use async_trait::async_trait;
use std::net::IpAddr;

/// Outcome of an FCrDNS check (§4.C). DNS failures never surface as errors
/// here — they fold into `Unverified` so detection always makes progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReverseDnsOutcome {
    Whitelisted,
    VerifiedOther(String),
    Unverified,
}

#[async_trait]
pub trait ReverseDnsPort: Send + Sync {
    /// Perform PTR then forward-confirm, classifying the result per §4.C.
    async fn verify(&self, address: IpAddr) -> ReverseDnsOutcome;
}
