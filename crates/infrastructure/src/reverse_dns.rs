use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use autofilter_application::ports::{ReverseDnsOutcome, ReverseDnsPort};
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::Resolver;
use tracing::debug;

/// Hostname suffixes FCrDNS treats as a trusted crawler (§4.C). Matched
/// case-insensitively; the trailing dot is required since hostnames
/// returned from PTR lookups are FQDNs.
const CRAWLER_SUFFIXES: &[&str] = &[
    ".googlebot.com.",
    ".google.com.",
    ".yandex.com.",
    ".yandex.net.",
    ".yandex.ru.",
    ".search.msn.com.",
    ".fbsv.net.",
];

pub struct FcrdnsVerifier {
    resolver: Resolver<TokioConnectionProvider>,
}

impl FcrdnsVerifier {
    /// Uses the system resolver configuration (`/etc/resolv.conf`).
    pub fn new() -> Self {
        let resolver = Resolver::builder_with_config(
            ResolverConfig::default(),
            TokioConnectionProvider::default(),
        )
        .build();
        Self { resolver }
    }

    /// Points at a single recursive resolver directly, per §1's "a
    /// recursive resolver reachable at a loopback address" — the daemon
    /// does not implement DNS resolution itself, only consumes one.
    pub fn with_nameserver(addr: SocketAddr) -> Self {
        let name_server = NameServerConfig::new(addr, Protocol::Udp);
        let config = ResolverConfig::from_parts(None, vec![], vec![name_server]);
        let resolver =
            Resolver::builder_with_config(config, TokioConnectionProvider::default()).build();
        Self { resolver }
    }

    fn is_crawler_hostname(hostname: &str) -> bool {
        let lower = hostname.to_ascii_lowercase();
        CRAWLER_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
    }
}

impl Default for FcrdnsVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReverseDnsPort for FcrdnsVerifier {
    async fn verify(&self, address: IpAddr) -> ReverseDnsOutcome {
        let ptr = match self.resolver.reverse_lookup(address).await {
            Ok(answer) => answer,
            Err(err) => {
                debug!(%address, error = %err, "PTR lookup failed");
                return ReverseDnsOutcome::Unverified;
            }
        };

        let Some(name) = ptr.iter().next() else {
            debug!(%address, "PTR lookup returned no records");
            return ReverseDnsOutcome::Unverified;
        };
        let hostname = name.to_utf8();

        let forward_confirmed = match address {
            IpAddr::V4(_) => self
                .resolver
                .ipv4_lookup(hostname.clone())
                .await
                .map(|answer| {
                    answer
                        .iter()
                        .any(|record| IpAddr::V4(record.0) == address)
                })
                .unwrap_or(false),
            IpAddr::V6(_) => self
                .resolver
                .ipv6_lookup(hostname.clone())
                .await
                .map(|answer| {
                    answer
                        .iter()
                        .any(|record| IpAddr::V6(record.0) == address)
                })
                .unwrap_or(false),
        };

        if !forward_confirmed {
            debug!(%address, %hostname, "forward confirmation failed");
            return ReverseDnsOutcome::Unverified;
        }

        if Self::is_crawler_hostname(&hostname) {
            ReverseDnsOutcome::Whitelisted
        } else {
            ReverseDnsOutcome::VerifiedOther(hostname)
        }
    }
}
