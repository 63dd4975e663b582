// vmstat_graph - Pipeline
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

use std::io;

use tracing::info;

use crate::config::PlotConfig;
use crate::error::{Error, Result};
use crate::normalize::{build_series, Series};
use crate::parse::{parse_dataset, read_input};
use crate::render::render;
use crate::select::select_columns;
use crate::summary::write_summary;

/// Runs one capture through read, parse, select, normalize and render.
/// Nothing is drawn unless every earlier stage succeeded.
pub fn run(config: &PlotConfig) -> Result<Vec<Series>> {
    let text = read_input(&config.input)?;
    let dataset = parse_dataset(&text)?;
    let columns = select_columns(&dataset, config.columns.as_deref())?;
    let series = build_series(&dataset, &columns, config);
    info!("Plotting {} columns over {} samples", series.len(), dataset.samples.len());

    render(&series, config)?;

    if config.summary {
        write_summary(&mut io::stdout().lock(), &series).map_err(|source| Error::Io {
            path: "<stdout>".into(),
            source,
        })?;
    }
    Ok(series)
}
