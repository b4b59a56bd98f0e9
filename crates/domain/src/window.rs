//! The per-minute traffic aggregate (§3 Data Model, §4.F detection passes).

use std::collections::HashMap;
use std::net::IpAddr;

use crate::log_line::LogLine;

/// Accumulated request weight for every client seen in one 1-minute window,
/// plus enough per-URI detail to run the one-URI-abuse pass without a
/// second read of the log.
#[derive(Debug, Clone, Default)]
pub struct CountsWindow {
    addr_count: HashMap<IpAddr, f64>,
    addr_uri_count: HashMap<IpAddr, HashMap<String, f64>>,
    country: HashMap<IpAddr, String>,
}

impl CountsWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one log line into the window: adds its weight to the client's
    /// total, to its per-URI bucket, and records the client's country (last
    /// writer wins, which in practice is stable per address per window).
    pub fn record(&mut self, line: &LogLine) {
        let weight = line.weight();
        *self.addr_count.entry(line.address).or_insert(0.0) += weight;
        *self
            .addr_uri_count
            .entry(line.address)
            .or_default()
            .entry(line.uri_key())
            .or_insert(0.0) += weight;
        self.country.insert(line.address, line.country.clone());
    }

    /// Total accumulated load for a client across every URI in the window.
    /// Used by the total-abuse pass (§4.F Pass 2).
    pub fn total_load(&self, address: &IpAddr) -> f64 {
        self.addr_count.get(address).copied().unwrap_or(0.0)
    }

    /// The load for a client *if and only if* every request it made in this
    /// window targeted a single distinct URI. Returns `None` for clients
    /// that touched more than one URI, since the one-URI-abuse pass (§4.F
    /// Pass 1) only fires on single-URI hammering.
    pub fn single_uri_load(&self, address: &IpAddr) -> Option<f64> {
        let uris = self.addr_uri_count.get(address)?;
        if uris.len() != 1 {
            return None;
        }
        uris.values().next().copied()
    }

    pub fn country_of(&self, address: &IpAddr) -> Option<&str> {
        self.country.get(address).map(String::as_str)
    }

    /// Every client address observed in this window.
    pub fn addresses(&self) -> impl Iterator<Item = &IpAddr> + '_ {
        self.addr_count.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.addr_count.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(addr: &str, uri: &str, cache: &str, rt: &str, country: &str) -> LogLine {
        LogLine::parse(&format!(
            "2024-01-02T03:04:05+00:00\t{country}\t{addr}\t{cache}\t{rt}\t200\thttps\texample.com\tGET\t{uri}\t512\t-\t-"
        ))
        .unwrap()
    }

    #[test]
    fn accumulates_weight_across_lines() {
        let mut w = CountsWindow::new();
        w.record(&line("1.2.3.4", "/a", "HIT", "0.01", "UA"));
        w.record(&line("1.2.3.4", "/a", "HIT", "0.01", "UA"));
        let addr: IpAddr = "1.2.3.4".parse().unwrap();
        assert_eq!(w.total_load(&addr), 2.0);
    }

    #[test]
    fn single_uri_load_is_none_when_multiple_uris_touched() {
        let mut w = CountsWindow::new();
        let addr: IpAddr = "1.2.3.4".parse().unwrap();
        w.record(&line("1.2.3.4", "/a", "HIT", "0.01", "UA"));
        w.record(&line("1.2.3.4", "/b", "HIT", "0.01", "UA"));
        assert_eq!(w.single_uri_load(&addr), None);
        assert_eq!(w.total_load(&addr), 2.0);
    }

    #[test]
    fn single_uri_load_is_some_when_one_uri_touched() {
        let mut w = CountsWindow::new();
        let addr: IpAddr = "1.2.3.4".parse().unwrap();
        w.record(&line("1.2.3.4", "/a", "-", "-", "UA"));
        w.record(&line("1.2.3.4", "/a", "-", "-", "UA"));
        assert_eq!(w.single_uri_load(&addr), Some(0.02));
    }

    #[test]
    fn country_of_tracks_last_seen() {
        let mut w = CountsWindow::new();
        let addr: IpAddr = "1.2.3.4".parse().unwrap();
        w.record(&line("1.2.3.4", "/a", "-", "-", "UA"));
        assert_eq!(w.country_of(&addr), Some("UA"));
    }

    #[test]
    fn unseen_address_has_zero_load_and_no_country() {
        let w = CountsWindow::new();
        let addr: IpAddr = "9.9.9.9".parse().unwrap();
        assert_eq!(w.total_load(&addr), 0.0);
        assert_eq!(w.country_of(&addr), None);
        assert!(w.is_empty());
    }
}
