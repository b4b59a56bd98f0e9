use std::collections::HashSet;
use std::net::IpAddr;

use autofilter_domain::{BotRecord, BotSet, ConfigTables, CountsWindow, ThresholdResolver};
use tracing::info;

use crate::ports::{ReverseDnsOutcome, ReverseDnsPort};

const UNKNOWN_HOSTNAME: &str = "UNKNOWN REVERSE DOMAIN NAME";

/// Result of running detection over one closed window (§4.F).
#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    pub new_records: Vec<BotRecord>,
}

/// Runs the two detection passes against an already-closed window. Pure
/// with respect to persistence and signaling: the caller decides whether
/// to write the result through (it is skipped in dry-run mode even though
/// this use case always runs).
pub struct DetectWindowUseCase;

impl DetectWindowUseCase {
    pub async fn run(
        window: &CountsWindow,
        bot_set: &BotSet,
        tables: &ConfigTables,
        reverse_dns: &dyn ReverseDnsPort,
        now: i64,
    ) -> DetectionOutcome {
        let mut already_detected: HashSet<IpAddr> = HashSet::new();
        let mut new_records = Vec::new();

        // Pass 1: one-URI abuse.
        for address in window.addresses() {
            if bot_set.contains(address) {
                continue;
            }
            let Some(load) = window.single_uri_load(address) else {
                continue;
            };
            let country = window.country_of(address).unwrap_or("").to_string();
            let limit = ThresholdResolver::resolve(&tables.one_uri_count, *address, &country);
            let observed = load.trunc() as u64;
            if observed <= limit {
                continue;
            }
            if let Some(record) = Self::qualify(
                *address,
                &country,
                observed,
                "ONE_URI_COUNT",
                reverse_dns,
                tables,
                now,
            )
            .await
            {
                already_detected.insert(*address);
                new_records.push(record);
            }
        }

        // Pass 2: total abuse. Skips addresses Pass 1 already recorded.
        for address in window.addresses() {
            if bot_set.contains(address) || already_detected.contains(address) {
                continue;
            }
            let load = window.total_load(address);
            let country = window.country_of(address).unwrap_or("").to_string();
            let limit = ThresholdResolver::resolve(&tables.request_count, *address, &country);
            let observed = load.trunc() as u64;
            if observed <= limit {
                continue;
            }
            if let Some(record) = Self::qualify(
                *address,
                &country,
                observed,
                "REQUEST_COUNT",
                reverse_dns,
                tables,
                now,
            )
            .await
            {
                new_records.push(record);
            }
        }

        DetectionOutcome { new_records }
    }

    async fn qualify(
        address: IpAddr,
        country: &str,
        observed_load: u64,
        reason_prefix: &str,
        reverse_dns: &dyn ReverseDnsPort,
        tables: &ConfigTables,
        now: i64,
    ) -> Option<BotRecord> {
        let hostname = match reverse_dns.verify(address).await {
            ReverseDnsOutcome::Whitelisted => return None,
            ReverseDnsOutcome::VerifiedOther(hostname) => hostname,
            ReverseDnsOutcome::Unverified => UNKNOWN_HOSTNAME.to_string(),
        };

        let block_secs = ThresholdResolver::resolve(&tables.block_duration, address, country);
        let block_until_epoch = now.saturating_add(block_secs as i64);
        let record = BotRecord {
            address,
            block_until_epoch,
            country: country.to_string(),
            observed_load,
            reason_text: format!("{reason_prefix} from {hostname}"),
        };
        info!(
            address = %record.address,
            reason = %record.reason_text,
            block_until_epoch,
            "detected offender"
        );
        Some(record)
    }
}
