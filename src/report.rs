//! Turns computed trends into the two artifacts: a colored map and a sortable table.

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use std::io::Write;

use crate::config::{color_token, SortOrder, TrendColors};
use crate::error::RenderFault;
use crate::incidence::{Direction, TrendResult};
use crate::map::MapDocument;
use crate::records::CountryInfo;

pub const TITLE: &str = "Incidence change in the EU";
pub const MAP_FILE: &str = "map-edited.svg";

/// One line of the report table. `change_key` is what a sorting client orders by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    #[serde(rename = "Country")]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Latest incidence")]
    pub latest: String,
    #[serde(rename = "Average incidence")]
    pub average: String,
    #[serde(rename = "Change")]
    pub change: String,
    #[serde(rename = "Change key")]
    pub change_key: String,
}

/// Percent change rounded to a whole point, ties to even, keeping the sign of a
/// value that rounds to zero (`-0.4` gives `-0`).
pub fn rounded_change(change_percent: f64) -> String {
    format!("{:.0}", change_percent)
}

impl TableRow {
    pub fn new(country: &CountryInfo, trend: &TrendResult) -> TableRow {
        TableRow {
            code: country.code.clone(),
            name: country.display_name.clone(),
            latest: format!("{:.1}", trend.latest),
            average: format!("{:.1}", trend.average),
            change: format!("{:+.0} %", trend.change_percent),
            change_key: rounded_change(trend.change_percent),
        }
    }
}

pub fn sort_trends(trends: &mut [(CountryInfo, TrendResult)], order: SortOrder) {
    match order {
        SortOrder::Catalog => {}
        SortOrder::ChangeDescending => trends.sort_by(|(a, ta), (b, tb)| {
            tb.change_percent
                .total_cmp(&ta.change_percent)
                .then_with(|| a.code.cmp(&b.code))
        }),
    }
}

/// Recolors the country's region; a FLAT trend keeps the neutral color.
pub fn annotate<D: MapDocument>(
    map: &mut D,
    trend: &TrendResult,
    colors: &TrendColors,
) -> Result<(), RenderFault> {
    let id = trend.country_code.to_lowercase();
    let element = map.locate_by_id(&id)?;
    let color = match trend.direction {
        Direction::Up => colors.rising,
        Direction::Down => colors.falling,
        Direction::Flat => return Ok(()),
    };
    let neutral = color_token(colors.neutral);
    if !map.set_style_token(element, &neutral, &color_token(color))? {
        warn!(country = %trend.country_code, "Map region has no {} to recolor, left as is", neutral);
    }
    Ok(())
}

/// Annotates every trend, returning the faults of the regions that couldn't be colored.
pub fn annotate_map<'a, D, I>(map: &mut D, trends: I, colors: &TrendColors) -> Vec<RenderFault>
where
    D: MapDocument,
    I: IntoIterator<Item = &'a TrendResult>,
{
    trends
        .into_iter()
        .filter_map(|trend| match annotate(map, trend, colors) {
            Ok(()) => None,
            Err(e) => {
                warn!(country = %trend.country_code, "Skipping map coloring: {}", e);
                Some(e)
            }
        })
        .collect()
}

fn escape(s: &str) -> std::borrow::Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Writes the results page: the edited map above a `sorttable` table.
pub fn render_html<W: Write>(
    out: &mut W,
    rows: &[TableRow],
    days: usize,
    generated_at: &chrono::DateTime<chrono::Local>,
) -> Result<()> {
    writeln!(out, "<!doctype html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    write!(
        out,
        "<head><title>{}</title><script src=\"sorttable.js\"></script>",
        TITLE
    )?;
    writeln!(out, "<style>td {{ border: 1px solid #a2a9b1; }}</style></head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<img src=\"{}\" alt=\"Map\" />", MAP_FILE)?;
    writeln!(
        out,
        "<table class=\"sortable\" style=\"border-collapse: collapse; width: 680px;\">"
    )?;
    write!(
        out,
        "<tr><th>Country</th><th>Name</th><th>Latest incidence</th><th>Average incidence<br />"
    )?;
    writeln!(
        out,
        "in the last {0} days</th><th>Change in<br />the last {0} days</th></tr>",
        days
    )?;
    for row in rows {
        writeln!(out, "{}", html_row(row))?;
    }
    write!(out, "</table>")?;
    write!(out, "<p>Report created at {}.</p>", generated_at)?;
    writeln!(out, "</body></html>")?;
    Ok(())
}

pub fn html_row(row: &TableRow) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td sorttable_customkey=\"{}\">{}</td></tr>",
        escape(&row.code),
        escape(&row.name),
        row.latest,
        row.average,
        row.change_key,
        row.change
    )
}

pub fn write_csv<W: Write>(out: W, rows: &[TableRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
