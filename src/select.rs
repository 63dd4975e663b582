// vmstat_graph - Column Selection
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

use tracing::debug;

use crate::error::{Error, Result};
use crate::header::Column;
use crate::parse::Dataset;

/// Picks the columns to plot. `None` selects every parsed column in header
/// order; otherwise the requested order is kept and every name must exist
/// in the input.
pub fn select_columns<'a>(dataset: &'a Dataset, requested: Option<&[String]>) -> Result<Vec<&'a Column>> {
    let Some(requested) = requested else {
        return Ok(dataset.columns.iter().collect());
    };

    let selected = requested
        .iter()
        .map(|name| {
            dataset.column(name).ok_or_else(|| {
                let available: Vec<&str> = dataset.columns.iter().map(|c| c.name.as_str()).collect();
                Error::config(format!(
                    "unknown column '{name}' (input has: {})",
                    available.join(",")
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(selected = ?requested, "column selection");
    Ok(selected)
}
