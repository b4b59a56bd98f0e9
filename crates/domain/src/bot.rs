//! The persistent bot set and its on-disk artifact format (§4.G).

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::AutofilterError;

/// One blocked client. `block_until_epoch` is the absolute expiry, in
/// Unix-epoch seconds; `observed_load` and `reason_text` are carried only
/// for operator visibility in the artifact, not used by the daemon itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotRecord {
    pub address: IpAddr,
    pub block_until_epoch: i64,
    pub country: String,
    pub observed_load: u64,
    pub reason_text: String,
}

impl BotRecord {
    fn format_line(&self) -> String {
        let block_until_iso = DateTime::<Utc>::from_timestamp(self.block_until_epoch, 0)
            .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap())
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            "{:<45} 1; #    {}    {:>7}    {}    {}",
            self.address, self.country, self.observed_load, block_until_iso, self.reason_text
        )
    }

    fn parse_line(line: &str) -> Result<BotRecord, AutofilterError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(AutofilterError::BotArtifactParse(line.to_string()));
        }
        let mut head_tail = line.splitn(2, '#');
        let head = head_tail
            .next()
            .ok_or_else(|| AutofilterError::BotArtifactParse(line.to_string()))?;
        let comment = head_tail
            .next()
            .ok_or_else(|| AutofilterError::BotArtifactParse(line.to_string()))?;

        let mut head_tokens = head.split_whitespace();
        let address_tok = head_tokens
            .next()
            .ok_or_else(|| AutofilterError::BotArtifactParse(line.to_string()))?;
        let address: IpAddr = address_tok
            .parse()
            .map_err(|_| AutofilterError::BotArtifactParse(line.to_string()))?;

        let mut comment_tokens = comment.split_whitespace();
        let country = comment_tokens
            .next()
            .ok_or_else(|| AutofilterError::BotArtifactParse(line.to_string()))?
            .to_string();
        let load_tok = comment_tokens
            .next()
            .ok_or_else(|| AutofilterError::BotArtifactParse(line.to_string()))?;
        let observed_load: u64 = load_tok
            .parse()
            .map_err(|_| AutofilterError::BotArtifactParse(line.to_string()))?;
        let block_until_tok = comment_tokens
            .next()
            .ok_or_else(|| AutofilterError::BotArtifactParse(line.to_string()))?;
        let block_until_epoch = DateTime::parse_from_rfc3339(block_until_tok)
            .map_err(|_| AutofilterError::BotArtifactParse(line.to_string()))?
            .timestamp();
        let reason_text = comment_tokens.collect::<Vec<_>>().join(" ");

        Ok(BotRecord {
            address,
            block_until_epoch,
            country,
            observed_load,
            reason_text,
        })
    }
}

/// The in-memory bot set: one record per blocked address.
#[derive(Debug, Clone, Default)]
pub struct BotSet {
    records: HashMap<IpAddr, BotRecord>,
}

impl BotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an artifact file's contents, dropping any record whose
    /// `block_until_epoch` has already passed relative to `now`. Malformed
    /// lines are skipped individually rather than failing the whole read,
    /// matching the tolerant, append-only nature of the artifact.
    pub fn parse(text: &str, now: i64) -> BotSet {
        let mut set = BotSet::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(record) = BotRecord::parse_line(line) {
                if record.block_until_epoch >= now {
                    set.records.insert(record.address, record);
                }
            }
        }
        set
    }

    /// Drop expired records in place. Called on every window close before
    /// detection runs, per §4.G / §8 property 5.
    pub fn expire(&mut self, now: i64) {
        self.records.retain(|_, r| r.block_until_epoch >= now);
    }

    /// Insert or overwrite a record for a re-offending address.
    pub fn upsert(&mut self, record: BotRecord) {
        self.records.insert(record.address, record);
    }

    pub fn contains(&self, address: &IpAddr) -> bool {
        self.records.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current address set, used by the reload controller to detect
    /// changes relative to the last published set (§4.H).
    pub fn addresses(&self) -> std::collections::HashSet<IpAddr> {
        self.records.keys().copied().collect()
    }

    /// Serialize to the on-disk artifact format: one record per line,
    /// sorted by load descending (ties broken by address for determinism).
    pub fn serialize(&self) -> String {
        let mut records: Vec<&BotRecord> = self.records.values().collect();
        records.sort_by(|a, b| {
            b.observed_load
                .cmp(&a.observed_load)
                .then_with(|| a.address.cmp(&b.address))
        });
        let mut out = String::new();
        for record in records {
            out.push_str(&record.format_line());
            out.push('\n');
        }
        out
    }
}
