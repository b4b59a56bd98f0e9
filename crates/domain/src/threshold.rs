//! Threshold tables and the precedence lookup described in spec §4.B.

use ipnetwork::IpNetwork;
use std::collections::HashMap;
use std::net::IpAddr;

use crate::errors::AutofilterError;

/// Sentinel for the config literal `none`: effectively disables a limit.
pub const UNLIMITED: u64 = u64::MAX;

/// Which of the three threshold tables a value belongs to. Mostly useful for
/// logging and for the invariant check that ties the request-count and
/// one-URI tables together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    RequestCount,
    OneUriCount,
    BlockDuration,
}

/// A parsed config-file entity: the key half of a `limit`/`block` directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Address(IpAddr),
    Cidr(IpNetwork),
    Country(String),
    All,
}

impl Entity {
    /// Parse a single already-cased token (see `config::tokenize_line`) into
    /// an `Entity`. Tokens are tried in the order the spec lists them:
    /// `ALL`, then CIDR (contains `/`), then exact address, then country code.
    pub fn parse(token: &str) -> Result<Entity, AutofilterError> {
        if token == "ALL" {
            return Ok(Entity::All);
        }
        if token.contains('/') {
            let net: IpNetwork = token
                .parse()
                .map_err(|e| AutofilterError::InvalidCidr(token.to_string(), format!("{e}")))?;
            return Ok(Entity::Cidr(net));
        }
        if let Ok(addr) = token.parse::<IpAddr>() {
            return Ok(Entity::Address(addr));
        }
        if token.len() == 2 && token.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(Entity::Country(token.to_string()));
        }
        Err(AutofilterError::InvalidEntity(token.to_string()))
    }
}

/// A resolved limit table for one threshold kind (request-count, one-URI
/// count, or block duration). Split into the three lookup shapes the
/// precedence algorithm actually needs instead of a single map, so exact and
/// country lookups stay O(1) while CIDR containment stays a deterministic,
/// insertion-ordered scan.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    by_address: HashMap<IpAddr, u64>,
    by_country: HashMap<String, u64>,
    /// Insertion order preserved deliberately: §4.B leaves CIDR iteration
    /// order unspecified by contract and only requires "first match wins".
    /// We pick config-file order as our stable, documented choice (see
    /// DESIGN.md / SPEC_FULL.md §4 Open Questions).
    by_cidr: Vec<(IpNetwork, u64)>,
    all: u64,
    all_explicit: bool,
}

impl ThresholdTable {
    pub fn with_default(all: u64) -> Self {
        Self {
            by_address: HashMap::new(),
            by_country: HashMap::new(),
            by_cidr: Vec::new(),
            all,
            all_explicit: false,
        }
    }

    /// Insert a value for `entity`. Returns an error if the entity was
    /// already present (duplicate entity fails the whole config file, per
    /// §4.A). `ALL` is an entity like any other: a config file naming it
    /// twice fails the same way a repeated address or country does.
    pub fn insert(&mut self, entity: Entity, value: u64) -> Result<(), AutofilterError> {
        match entity {
            Entity::All => {
                if self.all_explicit {
                    return Err(AutofilterError::ConfigParse(
                        "duplicate entity ALL".to_string(),
                    ));
                }
                self.all = value;
                self.all_explicit = true;
                Ok(())
            }
            Entity::Address(addr) => {
                if self.by_address.insert(addr, value).is_some() {
                    return Err(AutofilterError::ConfigParse(format!(
                        "duplicate entity {addr}"
                    )));
                }
                Ok(())
            }
            Entity::Country(code) => {
                if self.by_country.insert(code.clone(), value).is_some() {
                    return Err(AutofilterError::ConfigParse(format!(
                        "duplicate entity {code}"
                    )));
                }
                Ok(())
            }
            Entity::Cidr(net) => {
                if self.by_cidr.iter().any(|(existing, _)| *existing == net) {
                    return Err(AutofilterError::ConfigParse(format!(
                        "duplicate entity {net}"
                    )));
                }
                self.by_cidr.push((net, value));
                Ok(())
            }
        }
    }

    pub fn all(&self) -> u64 {
        self.all
    }

    pub fn get_exact(&self, address: &IpAddr) -> Option<u64> {
        self.by_address.get(address).copied()
    }

    pub fn get_cidr(&self, address: &IpAddr) -> Option<u64> {
        self.by_cidr
            .iter()
            .find(|(net, _)| net.contains(*address))
            .map(|(_, v)| *v)
    }

    pub fn get_country(&self, country: &str) -> Option<u64> {
        self.by_country.get(country).copied()
    }

    /// All entities with an explicit (non-`ALL`) value, for cross-table
    /// invariant checks.
    pub fn entities(&self) -> impl Iterator<Item = (Entity, u64)> + '_ {
        let addresses = self
            .by_address
            .iter()
            .map(|(a, v)| (Entity::Address(*a), *v));
        let countries = self
            .by_country
            .iter()
            .map(|(c, v)| (Entity::Country(c.clone()), *v));
        let cidrs = self.by_cidr.iter().map(|(n, v)| (Entity::Cidr(*n), *v));
        addresses.chain(countries).chain(cidrs)
    }
}

/// Implements the four-level precedence lookup from §4.B:
/// exact address → CIDR → country → `ALL`.
pub struct ThresholdResolver;

impl ThresholdResolver {
    pub fn resolve(table: &ThresholdTable, address: IpAddr, country: &str) -> u64 {
        table
            .get_exact(&address)
            .or_else(|| table.get_cidr(&address))
            .or_else(|| table.get_country(country))
            .unwrap_or_else(|| table.all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_beats_cidr_and_country() {
        let mut t = ThresholdTable::with_default(128);
        t.insert(Entity::Cidr("1.2.3.0/24".parse().unwrap()), 10)
            .unwrap();
        t.insert(Entity::Country("UA".to_string()), 5).unwrap();
        t.insert(Entity::Address("1.2.3.4".parse().unwrap()), 999)
            .unwrap();

        let addr: IpAddr = "1.2.3.4".parse().unwrap();
        assert_eq!(ThresholdResolver::resolve(&t, addr, "UA"), 999);
    }

    #[test]
    fn cidr_beats_country_and_default() {
        let mut t = ThresholdTable::with_default(128);
        t.insert(Entity::Cidr("1.2.3.0/24".parse().unwrap()), 10)
            .unwrap();
        t.insert(Entity::Country("UA".to_string()), 5).unwrap();

        let addr: IpAddr = "1.2.3.99".parse().unwrap();
        assert_eq!(ThresholdResolver::resolve(&t, addr, "UA"), 10);
    }

    #[test]
    fn country_beats_default() {
        let mut t = ThresholdTable::with_default(128);
        t.insert(Entity::Country("UA".to_string()), 5).unwrap();

        let addr: IpAddr = "8.8.8.8".parse().unwrap();
        assert_eq!(ThresholdResolver::resolve(&t, addr, "UA"), 5);
        assert_eq!(ThresholdResolver::resolve(&t, addr, "US"), 128);
    }

    #[test]
    fn first_matching_cidr_wins() {
        let mut t = ThresholdTable::with_default(128);
        t.insert(Entity::Cidr("1.2.0.0/16".parse().unwrap()), 1)
            .unwrap();
        t.insert(Entity::Cidr("1.2.3.0/24".parse().unwrap()), 2)
            .unwrap();

        let addr: IpAddr = "1.2.3.4".parse().unwrap();
        assert_eq!(ThresholdResolver::resolve(&t, addr, "ZZ"), 1);
    }

    #[test]
    fn duplicate_entity_rejected() {
        let mut t = ThresholdTable::with_default(128);
        t.insert(Entity::Country("UA".to_string()), 5).unwrap();
        assert!(t.insert(Entity::Country("UA".to_string()), 6).is_err());
    }

    #[test]
    fn duplicate_all_rejected() {
        let mut t = ThresholdTable::with_default(128);
        t.insert(Entity::All, 64).unwrap();
        assert!(t.insert(Entity::All, 32).is_err());
    }

    #[test]
    fn parse_entity_kinds() {
        assert_eq!(Entity::parse("ALL").unwrap(), Entity::All);
        assert!(matches!(Entity::parse("UA").unwrap(), Entity::Country(_)));
        assert!(matches!(
            Entity::parse("1.2.3.4").unwrap(),
            Entity::Address(_)
        ));
        assert!(matches!(
            Entity::parse("1.2.3.0/24").unwrap(),
            Entity::Cidr(_)
        ));
        assert!(Entity::parse("not-an-entity").is_err());
    }
}
