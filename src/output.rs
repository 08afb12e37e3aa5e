//! File-level run: read the three inputs, build the report, write the artifacts.
//!
//! Nothing is written unless the report could be built, so a catalog fault leaves the
//! output directory untouched.

use anyhow::{Context, Result};
use tracing::{info, warn};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::catalog::{AliasTable, CountryCatalog, PopulationTable};
use crate::config::ReportConfig;
use crate::map::SvgDocument;
use crate::{build_report, chart, records, report, Report};

pub const HTML_FILE: &str = "results.html";
pub const CSV_FILE: &str = "results.csv";
pub const CHART_FILE: &str = "change.png";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub cases: PathBuf,
    pub population: PathBuf,
    pub map: PathBuf,
    pub out_dir: PathBuf,
    pub config: ReportConfig,
    pub aliases: AliasTable,
    pub csv: bool,
    pub chart: bool,
}

/// Creates `name` under `dir`, hands a buffered writer to `f` and flushes it.
pub fn write_output<F>(dir: &Path, name: &str, f: F) -> Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    f(&mut out).with_context(|| format!("writing {}", path.display()))?;
    out.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(path)
}

pub fn run(opts: &RunOptions) -> Result<Report> {
    let config = &opts.config;
    anyhow::ensure!(config.days > 0, "the incidence window needs at least one day");

    let cases = records::load_cases(&opts.cases)?;
    let populations = PopulationTable::new(records::load_countries(&opts.population)?)?;
    info!(
        "Loaded {} case records and {} reference countries",
        cases.len(),
        populations.len()
    );
    let catalog = CountryCatalog::new(opts.aliases.clone(), populations);
    let mut map = SvgDocument::load(&opts.map)?;

    let results = build_report(&cases, &catalog, &mut map, config)?;

    std::fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("creating {}", opts.out_dir.display()))?;
    let generated_at = chrono::Local::now();
    write_output(&opts.out_dir, report::MAP_FILE, |out| map.write_to(out))?;
    let html = write_output(&opts.out_dir, HTML_FILE, |out| {
        report::render_html(out, &results.rows, config.days, &generated_at)
    })?;
    if opts.csv {
        write_output(&opts.out_dir, CSV_FILE, |out| {
            report::write_csv(out, &results.rows)
        })?;
    }
    if opts.chart {
        let trends: Vec<_> = results.trends.iter().map(|(_, t)| t.clone()).collect();
        let img_path = opts.out_dir.join(CHART_FILE);
        if let Err(e) = chart::plot_changes(&img_path, &trends, &config.colors, config.days) {
            warn!("Error plotting {}: {:?}", img_path.display(), e);
        }
    }

    info!(
        "Wrote {} countries to {} ({} skipped or uncolored)",
        results.rows.len(),
        html.display(),
        results.faults.len()
    );
    Ok(results)
}
