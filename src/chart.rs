use anyhow::Result;
use palette::Srgb;
use plotters::prelude::*;

use std::path::Path;

use crate::config::TrendColors;
use crate::incidence::{Direction, TrendResult};

fn rgb(color: Srgb<u8>) -> RGBColor {
    RGBColor(color.red, color.green, color.blue)
}

/// Bar color of a trend: same palette as the map.
pub fn bar_color(direction: Direction, colors: &TrendColors) -> RGBColor {
    rgb(match direction {
        Direction::Up => colors.rising,
        Direction::Down => colors.falling,
        Direction::Flat => colors.neutral,
    })
}

/// Vertical range covering every bar and the zero line, with a little headroom.
pub fn change_range<'a, I>(trends: I) -> (f64, f64)
where
    I: IntoIterator<Item = &'a TrendResult>,
{
    let (lo, hi) = trends
        .into_iter()
        .map(|t| t.change_percent)
        .fold((0.0f64, 0.0f64), |(lo, hi), c| (lo.min(c), hi.max(c)));
    let pad = ((hi - lo) * 0.1).max(1.0);
    (lo - pad, hi + pad)
}

/// Draws one bar per country with its percent change, in table order.
pub fn plot_changes(img_path: &Path, trends: &[TrendResult], colors: &TrendColors, days: usize) -> Result<()> {
    let root = BitMapBackend::new(img_path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let (min_y, max_y) = change_range(trends);
    let codes: Vec<&str> = trends.iter().map(|t| t.country_code.as_str()).collect();
    let n = trends.len().max(1);

    let label = |x: &f64| {
        let i = x.round();
        if i < 0.0 || (x - i).abs() > 0.01 {
            return String::new();
        }
        codes.get(i as usize).map(|c| c.to_string()).unwrap_or_default()
    };

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            format!("Change of the average incidence in the last {} days", days),
            ("sans-serif", 40),
        )
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), min_y..max_y)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label)
        .y_desc("Change (%)")
        .draw()?;

    chart.draw_series(trends.iter().enumerate().map(|(i, t)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.4, 0.0), (x + 0.4, t.change_percent)],
            bar_color(t.direction, colors).filled(),
        )
    }))?;
    chart.draw_series(LineSeries::new(
        vec![(-0.5, 0.0), (n as f64 - 0.5, 0.0)],
        &BLACK,
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incidence::IncidenceSeries;

    fn trend(change_percent: f64) -> TrendResult {
        TrendResult {
            country_code: "AT".to_string(),
            series: IncidenceSeries::default(),
            latest: 0.0,
            average: 0.0,
            change_percent,
            direction: Direction::of(change_percent),
        }
    }

    #[test]
    fn range_includes_zero_and_extremes() {
        let trends = vec![trend(40.0), trend(-10.0)];
        let (lo, hi) = change_range(&trends);
        assert!(lo < -10.0 && hi > 40.0);

        let (lo, hi) = change_range(&[trend(5.0)]);
        assert!(lo < 0.0 && hi > 5.0);
    }

    #[test]
    fn bars_use_map_colors() {
        let colors = TrendColors::default();
        let rgb = |d| {
            let c = bar_color(d, &colors);
            (c.0, c.1, c.2)
        };
        assert_eq!(rgb(Direction::Up), (0xc0, 0, 0));
        assert_eq!(rgb(Direction::Down), (0, 0xc0, 0));
        assert_eq!(rgb(Direction::Flat), (0xc0, 0xc0, 0xc0));
    }
}
