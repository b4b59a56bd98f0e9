//! Config-file grammar (§4.A): line-oriented, `#`-commented, whitespace
//! tokenized directives that build the three threshold tables.

use crate::errors::AutofilterError;
use crate::threshold::{Entity, ThresholdTable, UNLIMITED};

pub const DEFAULT_REQUEST_LIMIT: u64 = 128;
pub const DEFAULT_ONE_URI_LIMIT: u64 = 32;
pub const DEFAULT_BLOCK_SECS: u64 = 86_400;

/// The three threshold tables a loaded config produces.
#[derive(Debug, Clone)]
pub struct ConfigTables {
    pub request_count: ThresholdTable,
    pub one_uri_count: ThresholdTable,
    pub block_duration: ThresholdTable,
}

impl ConfigTables {
    /// The built-in defaults used when no config file is present, or when
    /// parsing fails at any line (§4.A: "the loader returns the built-in
    /// default table... the daemon continues").
    pub fn defaults() -> Self {
        Self {
            request_count: ThresholdTable::with_default(DEFAULT_REQUEST_LIMIT),
            one_uri_count: ThresholdTable::with_default(DEFAULT_ONE_URI_LIMIT),
            block_duration: ThresholdTable::with_default(DEFAULT_BLOCK_SECS),
        }
    }

    /// Parse config text per §4.A. On any error the caller should fall back
    /// to `ConfigTables::defaults()` and log the reason; this function
    /// itself never produces a partially-applied table.
    pub fn parse(text: &str) -> Result<Self, AutofilterError> {
        let mut tables = Self::defaults();

        for (lineno, raw_line) in text.lines().enumerate() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            let tokens = tokenize_line(line);
            if tokens.is_empty() {
                continue;
            }

            match tokens[0].as_str() {
                "LIMIT" => {
                    let (entity_raw, request, one_uri) =
                        parse_limit_directive(&tokens, lineno)?;
                    if one_uri > request {
                        return Err(AutofilterError::ConfigParse(format!(
                            "line {}: one_uri_count ({}) exceeds request_count ({})",
                            lineno + 1,
                            one_uri,
                            request
                        )));
                    }
                    tables.request_count.insert(entity_raw.clone(), request)?;
                    tables.one_uri_count.insert(entity_raw, one_uri)?;
                }
                "BLOCK" => {
                    let (entity_raw, seconds) = parse_block_directive(&tokens, lineno)?;
                    tables.block_duration.insert(entity_raw, seconds)?;
                }
                other => {
                    return Err(AutofilterError::ConfigParse(format!(
                        "line {}: unknown directive {:?}",
                        lineno + 1,
                        other
                    )));
                }
            }
        }

        // Missing ALL entries are synthesized from the defaults: `defaults()`
        // already seeded `all`, and `insert` for `Entity::All` only overwrites
        // it when the file actually names `ALL`.
        Ok(tables)
    }
}

/// Strip an end-of-line `#` comment.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Split on whitespace runs (tabs normalized to spaces by `split_whitespace`
/// treating all ASCII whitespace the same). Case-fold every token to
/// upper-case *except* tokens containing `:` (IPv6 addresses), which are
/// left untouched so they still parse as addresses.
fn tokenize_line(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(|t| {
            if t.contains(':') {
                t.to_string()
            } else {
                t.to_uppercase()
            }
        })
        .collect()
}

fn parse_count(token: &str) -> Option<u64> {
    if token == "NONE" {
        return Some(UNLIMITED);
    }
    let n: u64 = token.parse().ok()?;
    if n >= 1 {
        Some(n)
    } else {
        None
    }
}

fn parse_duration_seconds(token: &str) -> Option<u64> {
    let (digits, unit) = token.split_at(token.len().checked_sub(1)?);
    let n: u64 = digits.parse().ok()?;
    if n == 0 {
        return None;
    }
    match unit {
        "H" | "h" => Some(n * 3600),
        "D" | "d" => Some(n * 86_400),
        _ => None,
    }
}

fn parse_limit_directive(
    tokens: &[String],
    lineno: usize,
) -> Result<(Entity, u64, u64), AutofilterError> {
    if tokens.len() != 4 {
        return Err(AutofilterError::ConfigParse(format!(
            "line {}: `limit` expects 3 arguments",
            lineno + 1
        )));
    }
    let entity = Entity::parse(&tokens[1])?;
    let request = parse_count(&tokens[2]).ok_or_else(|| {
        AutofilterError::ConfigParse(format!(
            "line {}: invalid request_count {:?}",
            lineno + 1,
            tokens[2]
        ))
    })?;
    let one_uri = parse_count(&tokens[3]).ok_or_else(|| {
        AutofilterError::ConfigParse(format!(
            "line {}: invalid one_uri_count {:?}",
            lineno + 1,
            tokens[3]
        ))
    })?;
    Ok((entity, request, one_uri))
}

fn parse_block_directive(tokens: &[String], lineno: usize) -> Result<(Entity, u64), AutofilterError> {
    if tokens.len() != 3 {
        return Err(AutofilterError::ConfigParse(format!(
            "line {}: `block` expects 2 arguments",
            lineno + 1
        )));
    }
    let entity = Entity::parse(&tokens[1])?;
    let seconds = parse_duration_seconds(&tokens[2]).ok_or_else(|| {
        AutofilterError::ConfigParse(format!(
            "line {}: invalid duration {:?}",
            lineno + 1,
            tokens[2]
        ))
    })?;
    Ok((entity, seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::ThresholdResolver;

    #[test]
    fn empty_config_yields_defaults() {
        let tables = ConfigTables::parse("").unwrap();
        assert_eq!(tables.request_count.all(), DEFAULT_REQUEST_LIMIT);
        assert_eq!(tables.one_uri_count.all(), DEFAULT_ONE_URI_LIMIT);
        assert_eq!(tables.block_duration.all(), DEFAULT_BLOCK_SECS);
    }

    #[test]
    fn comments_and_blank_lines_ignored() {
        let tables = ConfigTables::parse("# a comment\n\n   \nlimit ALL 10 5 # trailing\n").unwrap();
        assert_eq!(tables.request_count.all(), 10);
        assert_eq!(tables.one_uri_count.all(), 5);
    }

    #[test]
    fn limit_and_block_directives() {
        let text = "limit 1.2.3.4 10 5\nblock 1.2.3.4 1h\n";
        let tables = ConfigTables::parse(text).unwrap();
        let addr = "1.2.3.4".parse().unwrap();
        assert_eq!(
            ThresholdResolver::resolve(&tables.request_count, addr, "ZZ"),
            10
        );
        assert_eq!(
            ThresholdResolver::resolve(&tables.one_uri_count, addr, "ZZ"),
            5
        );
        assert_eq!(
            ThresholdResolver::resolve(&tables.block_duration, addr, "ZZ"),
            3600
        );
    }

    #[test]
    fn country_code_is_upper_cased() {
        let tables = ConfigTables::parse("limit ua none none\n").unwrap();
        let addr = "5.6.7.8".parse().unwrap();
        assert_eq!(
            ThresholdResolver::resolve(&tables.request_count, addr, "UA"),
            UNLIMITED
        );
    }

    #[test]
    fn one_uri_exceeding_request_count_fails_file() {
        let text = "limit ALL 5 10\n";
        assert!(ConfigTables::parse(text).is_err());
    }

    #[test]
    fn duplicate_entity_fails_file() {
        let text = "limit 1.2.3.4 10 5\nlimit 1.2.3.4 20 10\n";
        assert!(ConfigTables::parse(text).is_err());
    }

    #[test]
    fn duplicate_all_fails_file() {
        let text = "limit ALL 10 5\nlimit ALL 20 10\n";
        assert!(ConfigTables::parse(text).is_err());
    }

    #[test]
    fn duplicate_block_all_fails_file() {
        let text = "block ALL 1h\nblock ALL 2h\n";
        assert!(ConfigTables::parse(text).is_err());
    }

    #[test]
    fn malformed_cidr_fails_file() {
        let text = "limit 10.0.0.0/abc 10 5\n";
        assert!(ConfigTables::parse(text).is_err());
    }

    #[test]
    fn unknown_directive_fails_file() {
        assert!(ConfigTables::parse("frobnicate ALL 1 2\n").is_err());
    }

    #[test]
    fn ipv6_entity_is_preserved_case() {
        let text = "limit 2001:DB8::1 10 5\n";
        let tables = ConfigTables::parse(text).unwrap();
        let addr = "2001:DB8::1".parse().unwrap();
        assert_eq!(
            ThresholdResolver::resolve(&tables.request_count, addr, "ZZ"),
            10
        );
    }

    #[test]
    fn duration_in_days() {
        let tables = ConfigTables::parse("block ALL 2d\n").unwrap();
        assert_eq!(tables.block_duration.all(), 2 * 86_400);
    }
}
