use anyhow::Result;
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

use incidencemap::catalog::AliasTable;
use incidencemap::config::{parse_color, ReportConfig, SortOrder, TrendColors, DAYS};
use incidencemap::output::{run, RunOptions};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "incidencemap",
    about = "Map and tabulate the change of the 7 day SARS-CoV-2 incidence in the EU"
)]
struct Opt {
    #[structopt(long, parse(from_os_str), default_value = "data.csv", help = "ECDC daily case data (CSV)")]
    cases: PathBuf,
    #[structopt(long, parse(from_os_str), default_value = "countries.csv", help = "Code,Name,Population table (CSV)")]
    population: PathBuf,
    #[structopt(long, parse(from_os_str), default_value = "map.svg", help = "Blank map with one region per lowercase country code")]
    map: PathBuf,
    #[structopt(long, parse(from_os_str), default_value = ".")]
    out_dir: PathBuf,
    #[structopt(long, help = "Number of days used for the average incidence (default 7)")]
    days: Option<usize>,
    #[structopt(long, help = "Order the table by change instead of country code")]
    sort_by_change: bool,
    #[structopt(long, parse(try_from_str = parse_color), help = "Region color the map starts with")]
    neutral_color: Option<palette::Srgb<u8>>,
    #[structopt(long, parse(try_from_str = parse_color))]
    rising_color: Option<palette::Srgb<u8>>,
    #[structopt(long, parse(try_from_str = parse_color))]
    falling_color: Option<palette::Srgb<u8>>,
    #[structopt(long, help = "Also write the table as results.csv")]
    csv: bool,
    #[structopt(long, help = "Also draw the changes as change.png")]
    chart: bool,
}

impl Opt {
    fn report_config(&self) -> ReportConfig {
        let defaults = TrendColors::default();
        ReportConfig {
            days: self.days.unwrap_or(DAYS),
            colors: TrendColors {
                neutral: self.neutral_color.unwrap_or(defaults.neutral),
                rising: self.rising_color.unwrap_or(defaults.rising),
                falling: self.falling_color.unwrap_or(defaults.falling),
            },
            sort: if self.sort_by_change {
                SortOrder::ChangeDescending
            } else {
                SortOrder::Catalog
            },
        }
    }

    fn into_run_options(self) -> RunOptions {
        let config = self.report_config();
        RunOptions {
            cases: self.cases,
            population: self.population,
            map: self.map,
            out_dir: self.out_dir,
            config,
            aliases: AliasTable::default(),
            csv: self.csv,
            chart: self.chart,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("incidencemap=info")),
        )
        .init();
    let opt = Opt::from_args();
    debug!("{:?}", opt);
    run(&opt.into_run_options())?;
    Ok(())
}
