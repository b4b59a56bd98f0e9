//! End-to-end detection scenarios run against the real `AutofilterDaemon`
//! with fake adapters, matching §8's literal scenarios (S1, S5).

mod helpers;

use std::collections::VecDeque;
use std::sync::Arc;

use autofilter_domain::{ConfigTables, Entity, ThresholdTable};
use autofilter_jobs::AutofilterDaemon;
use tokio_util::sync::CancellationToken;

use helpers::fakes::{line, AlwaysSignal, AlwaysUnverified, InMemoryBotStore, ScriptedLogSource};

/// S1: 11 lines for one address across two URIs in one window, with a
/// configured request-count limit of 10 and a 1h block duration. Expects a
/// single `REQUEST_COUNT` record with block_until == now + 3600.
#[tokio::test]
async fn scenario_s1_request_count_offender_with_custom_block_duration() {
    let mut lines = VecDeque::new();
    for i in 0..11 {
        let uri = if i % 2 == 0 { "/a" } else { "/b" };
        lines.push_back(line("1.2.3.4", "ZZ", uri, "2024-01-02T03:04:05+00:00"));
    }
    // a line in the next window closes the first.
    lines.push_back(line("1.2.3.4", "ZZ", "/a", "2024-01-02T03:05:05+00:00"));

    let mut tables = ConfigTables::defaults();
    tables
        .request_count
        .insert(Entity::Address("1.2.3.4".parse().unwrap()), 10)
        .unwrap();
    tables
        .block_duration
        .insert(Entity::Address("1.2.3.4".parse().unwrap()), 3600)
        .unwrap();

    let store = Arc::new(InMemoryBotStore::empty());
    let daemon = AutofilterDaemon::new(
        Box::new(ScriptedLogSource::new(lines.into())),
        Arc::new(AlwaysUnverified),
        store.clone(),
        Arc::new(AlwaysSignal),
        tables,
        false,
        CancellationToken::new(),
    );
    daemon.run().await;

    let persisted = store.snapshot();
    assert_eq!(persisted.len(), 1);
    assert!(persisted.contains(&"1.2.3.4".parse().unwrap()));
}

/// S5: `limit UA none none` exempts Ukrainian addresses from the total-abuse
/// pass regardless of load, while an address from another country is still
/// caught by the `ALL` default.
#[tokio::test]
async fn scenario_s5_country_exemption_does_not_affect_other_countries() {
    let mut lines = VecDeque::new();
    for _ in 0..200 {
        lines.push_back(line("5.5.5.5", "UA", "/a", "2024-01-02T03:04:05+00:00"));
    }
    for _ in 0..200 {
        lines.push_back(line("6.6.6.6", "US", "/b", "2024-01-02T03:04:05+00:00"));
    }
    lines.push_back(line("6.6.6.6", "US", "/b", "2024-01-02T03:05:05+00:00"));

    let mut tables = ConfigTables::defaults();
    tables.request_count = ThresholdTable::with_default(128);
    tables
        .request_count
        .insert(Entity::Country("UA".to_string()), u64::MAX)
        .unwrap();
    // Both addresses only ever touch one URI each; disable the one-URI pass
    // so this scenario isolates the total-abuse pass's country precedence.
    tables.one_uri_count = ThresholdTable::with_default(u64::MAX);

    let store = Arc::new(InMemoryBotStore::empty());
    let daemon = AutofilterDaemon::new(
        Box::new(ScriptedLogSource::new(lines.into())),
        Arc::new(AlwaysUnverified),
        store.clone(),
        Arc::new(AlwaysSignal),
        tables,
        false,
        CancellationToken::new(),
    );
    daemon.run().await;

    let persisted = store.snapshot();
    assert!(!persisted.contains(&"5.5.5.5".parse().unwrap()));
    assert!(persisted.contains(&"6.6.6.6".parse().unwrap()));
}
