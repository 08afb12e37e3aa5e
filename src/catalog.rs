//! Resolves which countries a run covers and what we know about each of them.
//!
//! The case source and the reference table don't always agree on country codes (the ECDC
//! reports Greece as `EL`, the rest of the world says `GR`). Every code coming out of the
//! case data goes through an [`AliasTable`] before it is joined against the
//! [`PopulationTable`].

use itertools::Itertools;

use std::collections::{BTreeMap, HashMap};

use crate::error::CatalogFault;
use crate::records::{CaseRecord, CountryInfo};

/// Case-source code -> canonical code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        AliasTable {
            aliases: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn canonical<'a>(&'a self, code: &'a str) -> &'a str {
        self.aliases.get(code).map(String::as_str).unwrap_or(code)
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        AliasTable::new([("EL", "GR")])
    }
}

/// Population and display name per canonical code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationTable {
    countries: BTreeMap<String, CountryInfo>,
}

impl PopulationTable {
    pub fn new(entries: Vec<CountryInfo>) -> Result<Self, CatalogFault> {
        let mut countries = BTreeMap::new();
        for info in entries {
            if info.population == 0 {
                return Err(CatalogFault::InvalidPopulation {
                    code: info.code,
                    population: info.population,
                });
            }
            if countries.contains_key(&info.code) {
                return Err(CatalogFault::DuplicateEntry { code: info.code });
            }
            countries.insert(info.code.clone(), info);
        }
        Ok(PopulationTable { countries })
    }

    pub fn get(&self, code: &str) -> Option<&CountryInfo> {
        self.countries.get(code)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    aliases: AliasTable,
    populations: PopulationTable,
}

impl CountryCatalog {
    pub fn new(aliases: AliasTable, populations: PopulationTable) -> Self {
        CountryCatalog {
            aliases,
            populations,
        }
    }

    pub fn canonical<'a>(&'a self, code: &'a str) -> &'a str {
        self.aliases.canonical(code)
    }

    /// Every country present in `cases`, ascending by canonical code.
    ///
    /// Fails on the first country the population table doesn't know about: computing an
    /// incidence without a population is meaningless.
    pub fn resolve_countries(&self, cases: &[CaseRecord]) -> Result<Vec<CountryInfo>, CatalogFault> {
        cases
            .iter()
            .map(|r| self.canonical(&r.country_code))
            .unique()
            .sorted()
            .map(|code| {
                self.populations
                    .get(code)
                    .cloned()
                    .ok_or_else(|| CatalogFault::MissingPopulation {
                        code: code.to_string(),
                    })
            })
            .collect()
    }

    /// Splits the case table by canonical code, so aliased and canonical rows land together.
    pub fn group_cases(&self, cases: &[CaseRecord]) -> HashMap<String, Vec<CaseRecord>> {
        cases
            .iter()
            .cloned()
            .into_group_map_by(|r| self.canonical(&r.country_code).to_string())
    }
}
