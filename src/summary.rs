// vmstat_graph - Series Summary Table
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

use std::io::{self, Write};

use crate::normalize::Series;

/// Min/avg/max of one plotted series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub name: String,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

pub fn series_stats(series: &Series) -> SeriesStats {
    let count = series.points.len();
    let (min, max, sum) = series.ys().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), y| (min.min(y), max.max(y), sum + y),
    );
    if count == 0 {
        return SeriesStats { name: series.name.clone(), min: 0.0, avg: 0.0, max: 0.0 };
    }
    SeriesStats {
        name: series.name.clone(),
        min,
        avg: sum / count as f64,
        max,
    }
}

/// Writes one aligned row per series.
pub fn write_summary<W: Write>(out: &mut W, series: &[Series]) -> io::Result<()> {
    writeln!(out, "{:<8} {:<8} {:>14} {:>14} {:>14}", "Column", "Category", "Min", "Avg", "Max")?;
    for s in series {
        let stats = series_stats(s);
        let unit = if s.normalized { "%" } else { s.unit.suffix() };
        writeln!(
            out,
            "{:<8} {:<8} {:>14.2} {:>14.2} {:>14.2} {}",
            stats.name,
            s.category.label(),
            stats.min,
            stats.avg,
            stats.max,
            unit
        )?;
    }
    Ok(())
}
