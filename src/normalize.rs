// vmstat_graph - Unit Normalization
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
    # normalize.rs

    Turns selected columns into plottable [`Series`].

    - RAM normalization rescales memory-category columns (kilobytes) to a
      percentage of the total RAM. Every other category is left untouched,
      whatever was selected, because only memory columns are sizes.
    - With a sampling interval the X value of row `i` is `i * interval`
      seconds, otherwise it is the row index.
*/

use std::num::NonZeroU64;

use tracing::info;

use crate::config::PlotConfig;
use crate::header::{Category, Column, Unit};
use crate::parse::Dataset;

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// Legend text
    pub label: String,
    pub category: Category,
    pub unit: Unit,
    /// Values are percent of total RAM
    pub normalized: bool,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, y)| y)
    }
}

/// Percent of `ram_bytes` taken by `value_kb` kilobytes.
pub fn ram_percent(value_kb: f64, ram_bytes: NonZeroU64) -> f64 {
    value_kb * 1024.0 / ram_bytes.get() as f64 * 100.0
}

/// X values for `rows` samples.
pub fn time_axis(rows: usize, interval: Option<NonZeroU64>) -> Vec<f64> {
    let step = interval.map_or(1.0, |i| i.get() as f64);
    (0..rows).map(|i| i as f64 * step).collect()
}

fn legend_label(column: &Column, normalized: bool) -> String {
    let unit = if normalized { "%" } else { column.unit.suffix() };
    if unit.is_empty() {
        format!("{}: {}", column.name, column.description)
    } else {
        format!("{}: {} ({unit})", column.name, column.description)
    }
}

/// Builds one series per selected column. Normalization runs exactly once
/// here; nothing downstream rescales values.
pub fn build_series(dataset: &Dataset, columns: &[&Column], config: &PlotConfig) -> Vec<Series> {
    let xs = time_axis(dataset.samples.len(), config.interval);
    if let Some(ram) = config.ram_bytes {
        info!("Normalizing memory columns to {} MB of RAM", ram.get() / (1024 * 1024));
    }

    columns
        .iter()
        .filter_map(|column| {
            let values = dataset.values(&column.name)?;
            let ram = config.ram_bytes.filter(|_| column.category == Category::Memory);
            let points = xs
                .iter()
                .zip(values)
                .map(|(&x, y)| (x, ram.map_or(y, |ram| ram_percent(y, ram))))
                .collect();
            Some(Series {
                name: column.name.clone(),
                label: legend_label(column, ram.is_some()),
                category: column.category,
                unit: column.unit,
                normalized: ram.is_some(),
                points,
            })
        })
        .collect()
}
