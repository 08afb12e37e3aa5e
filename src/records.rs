use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use std::io::Read;
use std::path::Path;

/// One day of new cases for one country, as reported by the case source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    pub country_code: String,
    pub date: chrono::NaiveDate,
    pub cases: u64,
}

/// Importer for the
/// [ECDC daily new cases in the EU/EEA](https://www.ecdc.europa.eu/en/publications-data/data-daily-new-cases-covid-19-eueea-country)
///
/// Requires the [raw data in CSV format](https://opendata.ecdc.europa.eu/covid19/nationalcasedeath_eueea_daily_ei/csv/data.csv)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EcdcRecord {
    #[serde(rename = "dateRep")]
    #[serde(with = "dmY_date_format")]
    date: chrono::NaiveDate,
    cases: Option<i64>,
    #[serde(rename = "geoId")]
    geo_id: String,
}

/// Reference data for one country: canonical code, display name and population.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CountryInfo {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Name")]
    pub display_name: String,
    #[serde(rename = "Population")]
    pub population: u64,
}

#[allow(non_snake_case)]
mod dmY_date_format {
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y";
    pub fn serialize<S>(nd: &chrono::NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = format!("{}", nd.format(FORMAT));
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<chrono::NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        chrono::NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Deserializes every row of a CSV stream, skipping (and logging) rows that don't fit `T`.
pub fn csvrecs<T, R>(reader: R) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize()
        .enumerate()
        .filter_map(|(row, o)| match o {
            Ok(rec) => Some(rec),
            Err(e) => {
                warn!(row = row + 1, "Error unpacking record: {}", e);
                None
            }
        })
        .collect()
}

impl EcdcRecord {
    /// Normalizes a raw row; rows without a country code are dropped.
    pub fn into_case_record(self) -> Option<CaseRecord> {
        let country_code = self.geo_id.trim().to_string();
        if country_code.is_empty() {
            warn!(date = %self.date, "Dropping case record without a country code");
            return None;
        }
        let cases = match self.cases {
            Some(n) if n < 0 => {
                warn!(country = %country_code, date = %self.date, cases = n, "Clamping negative case count to 0");
                0
            }
            Some(n) => n as u64,
            None => 0,
        };
        Some(CaseRecord {
            country_code,
            date: self.date,
            cases,
        })
    }
}

pub fn read_cases<R: Read>(reader: R) -> Vec<CaseRecord> {
    csvrecs::<EcdcRecord, R>(reader)
        .into_iter()
        .filter_map(EcdcRecord::into_case_record)
        .collect()
}

pub fn read_countries<R: Read>(reader: R) -> Vec<CountryInfo> {
    csvrecs(reader)
}

pub fn load_cases(path: &Path) -> Result<Vec<CaseRecord>> {
    let infile = std::fs::File::open(path)
        .with_context(|| format!("opening case data {}", path.display()))?;
    Ok(read_cases(std::io::BufReader::new(infile)))
}

pub fn load_countries(path: &Path) -> Result<Vec<CountryInfo>> {
    let infile = std::fs::File::open(path)
        .with_context(|| format!("opening population data {}", path.display()))?;
    Ok(read_countries(std::io::BufReader::new(infile)))
}
