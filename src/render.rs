// vmstat_graph - Chart Rendering
// Copyright (C) 2024 Laurence Oberman
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

/*!
    # render.rs

    Draws every series on one chart with a shared X axis and one legend
    entry per column, then writes an SVG file and/or opens the chart in the
    system viewer.

    Logarithmic charts clip every value below the log floor (zeros and
    negatives included) to that floor, for every series alike. The floor is
    the smallest positive value plotted, capped at 1.0.
*/

use std::ops::Range;
use std::path::Path;
use std::process::Command;

use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::config::PlotConfig;
use crate::error::{Error, Result};
use crate::normalize::Series;

const LOG_FLOOR_CAP: f64 = 1.0;

#[cfg(target_os = "macos")]
const VIEWER: &str = "open";
#[cfg(not(target_os = "macos"))]
const VIEWER: &str = "xdg-open";

fn backend_err<E: std::fmt::Display>(err: E) -> Error {
    Error::render(err.to_string())
}

/// Lowest Y value shown on a logarithmic chart.
pub fn log_floor(series: &[Series]) -> f64 {
    series
        .iter()
        .flat_map(|s| s.ys())
        .filter(|&y| y > 0.0)
        .fold(LOG_FLOOR_CAP, f64::min)
}

pub fn clip_for_log(y: f64, floor: f64) -> f64 {
    y.max(floor)
}

/// Axis ranges of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub x: Range<f64>,
    pub y: Range<f64>,
}

/// Axis ranges covering every point; `log_floor` is set for log charts.
pub fn plot_bounds(series: &[Series], log_floor: Option<f64>) -> Bounds {
    let x_max = series
        .iter()
        .filter_map(|s| s.points.last())
        .map(|&(x, _)| x)
        .fold(0.0, f64::max)
        .max(1.0);
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.ys())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));

    let y = match log_floor {
        Some(floor) => floor..hi.max(floor * 10.0) * 1.5,
        None => {
            let lo = if lo.is_finite() { lo.min(0.0) } else { 0.0 };
            let hi = if hi.is_finite() { hi.max(1.0) } else { 1.0 };
            lo..hi * 1.05
        }
    };
    Bounds { x: 0.0..x_max, y }
}

/// Formats elapsed seconds as `H:MM:SS`.
pub fn elapsed_label(secs: &f64) -> String {
    match chrono::TimeDelta::try_seconds(secs.round() as i64) {
        Some(d) => format!("{}:{:02}:{:02}", d.num_hours(), d.num_minutes() % 60, d.num_seconds() % 60),
        None => format!("{secs:.0}"),
    }
}

fn sample_label(x: &f64) -> String {
    format!("{x:.0}")
}

fn y_axis_description(series: &[Series]) -> String {
    if series.iter().all(|s| s.normalized) {
        return "% of RAM".to_string();
    }
    match series.first() {
        Some(first)
            if !first.unit.suffix().is_empty()
                && series.iter().all(|s| !s.normalized && s.unit == first.unit) =>
        {
            format!("Value ({})", first.unit.suffix())
        }
        _ => "Value".to_string(),
    }
}

fn draw_lines<'a, Y>(
    chart: &mut ChartContext<'a, SVGBackend<'a>, Cartesian2d<RangedCoordf64, Y>>,
    series: &[Series],
    log_floor: Option<f64>,
) -> Result<()>
where
    Y: Ranged<ValueType = f64>,
{
    for (idx, s) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points = s
            .points
            .iter()
            .map(move |&(x, y)| (x, log_floor.map_or(y, |floor| clip_for_log(y, floor))));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(backend_err)?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(backend_err)?;
    Ok(())
}

/// Writes the chart to `path` as SVG.
pub fn render_svg(series: &[Series], config: &PlotConfig, path: &Path) -> Result<()> {
    if series.is_empty() {
        return Err(Error::render("no series to plot"));
    }

    let root = SVGBackend::new(path, config.size).into_drawing_area();
    root.fill(&WHITE).map_err(backend_err)?;

    let floor = config.logarithmic.then(|| log_floor(series));
    let bounds = plot_bounds(series, floor);
    debug!(?bounds, ?floor, "chart bounds");

    let (x_desc, x_fmt): (&str, fn(&f64) -> String) = if config.interval.is_some() {
        ("Elapsed time (H:MM:SS)", elapsed_label as fn(&f64) -> String)
    } else {
        ("Sample", sample_label)
    };
    let y_desc = y_axis_description(series);

    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(&config.title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70);

    match floor {
        Some(floor) => {
            let mut chart = builder
                .build_cartesian_2d(bounds.x, bounds.y.log_scale())
                .map_err(backend_err)?;
            chart
                .configure_mesh()
                .x_labels(10)
                .x_label_formatter(&x_fmt)
                .x_desc(x_desc)
                .y_desc(&y_desc)
                .draw()
                .map_err(backend_err)?;
            draw_lines(&mut chart, series, Some(floor))?;
        }
        None => {
            let mut chart = builder
                .build_cartesian_2d(bounds.x, bounds.y)
                .map_err(backend_err)?;
            chart
                .configure_mesh()
                .x_labels(10)
                .x_label_formatter(&x_fmt)
                .x_desc(x_desc)
                .y_desc(&y_desc)
                .draw()
                .map_err(backend_err)?;
            draw_lines(&mut chart, series, None)?;
        }
    }

    root.present().map_err(backend_err)?;
    info!("Writing SVG: {}", path.display());
    Ok(())
}

/// Renders to a kept temporary SVG and hands it to the system viewer.
fn display(series: &[Series], config: &PlotConfig) -> Result<()> {
    let path = tempfile::Builder::new()
        .prefix("vmstat_graph-")
        .suffix(".svg")
        .tempfile()
        .map_err(|e| Error::render(format!("cannot create temporary SVG: {e}")))?
        .into_temp_path()
        .keep()
        .map_err(backend_err)?;
    render_svg(series, config, &path)?;

    info!("Opening {} with {VIEWER}", path.display());
    let status = Command::new(VIEWER)
        .arg(&path)
        .status()
        .map_err(|e| Error::render(format!("cannot launch {VIEWER}: {e}")))?;
    if !status.success() {
        return Err(Error::render(format!("{VIEWER} exited with {status}")));
    }
    Ok(())
}

/// Produces every requested output.
pub fn render(series: &[Series], config: &PlotConfig) -> Result<()> {
    if let Some(path) = &config.output.svg {
        render_svg(series, config, path)?;
    }
    if config.output.display {
        display(series, config)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputMode;
    use crate::header::{Category, Unit};
    use std::num::NonZeroU64;

    fn series(name: &str, ys: &[f64]) -> Series {
        Series {
            name: name.to_string(),
            label: format!("{name}: test"),
            category: Category::Swap,
            unit: Unit::KilobytesPerSec,
            normalized: false,
            points: ys.iter().enumerate().map(|(i, &y)| (i as f64, y)).collect(),
        }
    }

    #[test]
    fn floor_is_smallest_positive_value() {
        let data = [series("so", &[0.0, 0.0]), series("bi", &[0.25, 40.0])];
        assert_eq!(log_floor(&data), 0.25);
        assert_eq!(log_floor(&[series("so", &[0.0, 0.0])]), 1.0);
        assert_eq!(log_floor(&[series("bi", &[5.0, 40.0])]), 1.0);
    }

    #[test]
    fn clipping_lifts_zeros_and_negatives() {
        assert_eq!(clip_for_log(0.0, 0.5), 0.5);
        assert_eq!(clip_for_log(-3.0, 0.5), 0.5);
        assert_eq!(clip_for_log(7.0, 0.5), 7.0);
    }

    #[test]
    fn bounds_cover_data() {
        let data = [series("bi", &[2.0, 40.0, 8.0])];
        let linear = plot_bounds(&data, None);
        assert_eq!(linear.x, 0.0..2.0);
        assert_eq!(linear.y.start, 0.0);
        assert!(linear.y.end >= 40.0);

        let log = plot_bounds(&data, Some(1.0));
        assert_eq!(log.y.start, 1.0);
        assert!(log.y.end > 40.0);

        let zeros = plot_bounds(&[series("so", &[0.0])], Some(1.0));
        assert!(zeros.y.end > zeros.y.start);
        assert_eq!(zeros.x, 0.0..1.0);
    }

    #[test]
    fn elapsed_labels() {
        assert_eq!(elapsed_label(&0.0), "0:00:00");
        assert_eq!(elapsed_label(&3725.0), "1:02:05");
    }

    #[test]
    fn log_chart_with_all_zero_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.svg");
        let mut config = PlotConfig::new(OutputMode::svg(&path));
        config.logarithmic = true;
        config.interval = NonZeroU64::new(5);
        let data = [series("so", &[0.0, 0.0, 0.0]), series("bi", &[33.0, 0.0, 12.0])];

        render(&data, &config).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("so: test"));
        assert!(svg.contains("bi: test"));
    }

    #[test]
    fn linear_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linear.svg");
        let config = PlotConfig::new(OutputMode::svg(&path));
        render(&[series("bi", &[33.0, 0.0, 12.0])], &config).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn nothing_to_plot() {
        let config = PlotConfig::new(OutputMode::svg("unused.svg"));
        assert!(matches!(render(&[], &config), Err(Error::Render(_))));
    }
}
