//! Access-log line parsing (§4.E): 13 TAB-separated fields per line.

use crate::errors::AutofilterError;
use std::net::IpAddr;

pub const LINE_FIELD_COUNT: usize = 13;

/// One parsed access-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub time_iso: String,
    pub country: String,
    pub address: IpAddr,
    pub upstream_cache_status: String,
    pub upstream_response_time: String,
    pub status: String,
    pub scheme: String,
    pub host: String,
    pub method: String,
    pub uri: String,
    pub body_bytes: String,
    pub referer: String,
    pub user_agent: String,
}

impl LogLine {
    /// Parse a single raw line. Lines with a field count other than
    /// `LINE_FIELD_COUNT`, or an unparsable address, are rejected; the
    /// caller is expected to skip and count such lines rather than abort
    /// the tail.
    pub fn parse(raw: &str) -> Result<LogLine, AutofilterError> {
        let fields: Vec<&str> = raw.split('\t').collect();
        if fields.len() != LINE_FIELD_COUNT {
            return Err(AutofilterError::InvalidEntity(format!(
                "expected {} fields, found {}",
                LINE_FIELD_COUNT,
                fields.len()
            )));
        }
        let address: IpAddr = fields[2]
            .parse()
            .map_err(|_| AutofilterError::InvalidEntity(format!("bad address {:?}", fields[2])))?;

        Ok(LogLine {
            time_iso: fields[0].to_string(),
            country: fields[1].to_string(),
            address,
            upstream_cache_status: fields[3].to_string(),
            upstream_response_time: fields[4].to_string(),
            status: fields[5].to_string(),
            scheme: fields[6].to_string(),
            host: fields[7].to_string(),
            method: fields[8].to_string(),
            uri: fields[9].to_string(),
            body_bytes: fields[10].to_string(),
            referer: fields[11].to_string(),
            user_agent: fields[12].to_string(),
        })
    }

    /// Request weight: 0.01 for an edge-cached response (both
    /// `upstream_cache_status` and `upstream_response_time` are the literal
    /// `-`), 1.0 otherwise.
    pub fn weight(&self) -> f64 {
        if self.upstream_cache_status == "-" && self.upstream_response_time == "-" {
            0.01
        } else {
            1.0
        }
    }

    /// `host` + `uri` combined into the key used to count distinct URIs per
    /// client in the one-URI-abuse pass.
    pub fn uri_key(&self) -> String {
        format!("{}{}", self.host, self.uri)
    }

    /// The minute-resolution window key: the first 16 characters of
    /// `time_iso` (`YYYY-MM-DDTHH:MM`) with the `T` at index 10 normalized
    /// to a space, so `2024-01-02T03:04:05+00:00` becomes
    /// `2024-01-02 03:04`.
    pub fn window_key(&self) -> Option<String> {
        if self.time_iso.len() < 16 {
            return None;
        }
        let mut prefix: Vec<char> = self.time_iso.chars().take(16).collect();
        if prefix.get(10) != Some(&'T') {
            return None;
        }
        prefix[10] = ' ';
        Some(prefix.into_iter().collect())
    }
}
