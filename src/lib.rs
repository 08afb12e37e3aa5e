//! Rolling 7-day COVID-19 incidence per country, its trend, and the map and table that
//! show it.
//!
//! A run is [`build_report`]: the [`catalog::CountryCatalog`] decides which countries are
//! covered, [`incidence::compute_trend`] works out each country's trend, and
//! [`report`] colors the map and lays out the table. Countries whose trend can't be
//! computed, or whose map region can't be found, are logged and skipped; a country without
//! reference data stops the run before anything is produced.

use tracing::{info, warn};

pub mod catalog;
pub mod chart;
pub mod config;
pub mod error;
pub mod incidence;
pub mod map;
pub mod output;
pub mod records;
pub mod report;

use catalog::CountryCatalog;
use config::ReportConfig;
use error::{CatalogFault, Fault};
use incidence::TrendResult;
use map::MapDocument;
use records::{CaseRecord, CountryInfo};
use report::TableRow;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Countries with a computable trend, in table order.
    pub trends: Vec<(CountryInfo, TrendResult)>,
    pub rows: Vec<TableRow>,
    pub faults: Vec<Fault>,
}

pub fn build_report<D: MapDocument>(
    cases: &[CaseRecord],
    catalog: &CountryCatalog,
    map: &mut D,
    config: &ReportConfig,
) -> Result<Report, CatalogFault> {
    let countries = catalog.resolve_countries(cases)?;
    let by_country = catalog.group_cases(cases);
    let mut faults: Vec<Fault> = Vec::new();

    let mut trends = Vec::with_capacity(countries.len());
    for country in countries {
        let series = by_country
            .get(&country.code)
            .map(Vec::as_slice)
            .unwrap_or_default();
        match incidence::compute_trend(&country.code, series, country.population, config.days) {
            Ok(trend) => {
                info!(
                    country = %country.code,
                    "average {:.1}; change {:+.0} %",
                    trend.average,
                    trend.change_percent
                );
                trends.push((country, trend));
            }
            Err(e) => {
                warn!(country = %country.code, "Skipping country: {}", e);
                faults.push(e.into());
            }
        }
    }

    report::sort_trends(&mut trends, config.sort);

    let render_faults = report::annotate_map(map, trends.iter().map(|(_, t)| t), &config.colors);
    faults.extend(render_faults.into_iter().map(Fault::from));

    let rows = trends
        .iter()
        .map(|(country, trend)| TableRow::new(country, trend))
        .collect();

    Ok(Report {
        trends,
        rows,
        faults,
    })
}
