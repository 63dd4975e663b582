// vmstat_graph - Header Parsing
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
    # header.rs

    Recognizes the two vmstat header lines and turns them into an ordered
    column list.

    - The category line (`procs -----memory----- ...`) is scanned for label
      spans by character offset.
    - Each name on the column line is mapped to the category span it sits
      under. Field widths change with the magnitude of the values, so no
      fixed offsets are assumed.
*/

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").expect("token pattern"));

/// Column groupings printed on the first vmstat header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Procs,
    Memory,
    Swap,
    Io,
    System,
    Cpu,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Procs,
        Category::Memory,
        Category::Swap,
        Category::Io,
        Category::System,
        Category::Cpu,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Procs => "procs",
            Category::Memory => "memory",
            Category::Swap => "swap",
            Category::Io => "io",
            Category::System => "system",
            Category::Cpu => "cpu",
        }
    }

    /// Accepts a raw header token such as `---swap--`.
    pub fn from_label(token: &str) -> Option<Self> {
        let label = token.trim_matches('-');
        Category::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Unit of the raw values vmstat prints for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Count,
    Kilobytes,
    KilobytesPerSec,
    BlocksPerSec,
    PerSec,
    Percent,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Count => "",
            Unit::Kilobytes => "KB",
            Unit::KilobytesPerSec => "KB/s",
            Unit::BlocksPerSec => "blocks/s",
            Unit::PerSec => "/s",
            Unit::Percent => "%",
        }
    }
}

struct Known {
    name: &'static str,
    category: Category,
    unit: Unit,
    description: &'static str,
}

const fn known(name: &'static str, category: Category, unit: Unit, description: &'static str) -> Known {
    Known { name, category, unit, description }
}

// Columns printed by procps vmstat in its default, -a and -w layouts.
const VOCABULARY: &[Known] = &[
    known("r", Category::Procs, Unit::Count, "Runnable processes"),
    known("b", Category::Procs, Unit::Count, "Blocked processes"),
    known("swpd", Category::Memory, Unit::Kilobytes, "Swapped memory"),
    known("free", Category::Memory, Unit::Kilobytes, "Free memory"),
    known("buff", Category::Memory, Unit::Kilobytes, "I/O buffers"),
    known("cache", Category::Memory, Unit::Kilobytes, "FS cache"),
    known("inact", Category::Memory, Unit::Kilobytes, "Inactive memory"),
    known("active", Category::Memory, Unit::Kilobytes, "Active memory"),
    known("si", Category::Swap, Unit::KilobytesPerSec, "Swap-ins"),
    known("so", Category::Swap, Unit::KilobytesPerSec, "Swap-outs"),
    known("bi", Category::Io, Unit::BlocksPerSec, "Blocks in (reads)"),
    known("bo", Category::Io, Unit::BlocksPerSec, "Blocks out (writes)"),
    known("in", Category::System, Unit::PerSec, "Interrupts"),
    known("cs", Category::System, Unit::PerSec, "Context switches"),
    known("us", Category::Cpu, Unit::Percent, "User CPU"),
    known("sy", Category::Cpu, Unit::Percent, "Kernel CPU"),
    known("id", Category::Cpu, Unit::Percent, "Idle CPU"),
    known("wa", Category::Cpu, Unit::Percent, "I/O wait CPU"),
    known("st", Category::Cpu, Unit::Percent, "Stolen VM CPU"),
    known("gu", Category::Cpu, Unit::Percent, "Guest CPU"),
];

fn lookup(name: &str) -> Option<&'static Known> {
    VOCABULARY.iter().find(|k| k.name == name)
}

/// True if `name` is a column vmstat can print.
pub fn is_known_column(name: &str) -> bool {
    lookup(name).is_some()
}

/// All column names vmstat can print, in header order.
pub fn known_columns() -> impl Iterator<Item = &'static str> {
    VOCABULARY.iter().map(|k| k.name)
}

/// One column of the parsed header.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub category: Category,
    pub unit: Unit,
    pub description: &'static str,
}

/// Category line: first token is the `procs` label.
pub fn is_category_line(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|t| Category::from_label(t) == Some(Category::Procs))
}

/// Column-name line: first token is `r`.
pub fn is_column_line(line: &str) -> bool {
    line.split_whitespace().next() == Some("r")
}

fn spans(line: &str) -> impl Iterator<Item = (Range<usize>, &str)> {
    TOKEN.find_iter(line).map(|m| (m.range(), m.as_str()))
}

fn overlap(a: &Range<usize>, b: &Range<usize>) -> usize {
    a.end.min(b.end).saturating_sub(a.start.max(b.start))
}

fn gap(a: &Range<usize>, b: &Range<usize>) -> usize {
    if a.end <= b.start {
        b.start - a.end
    } else {
        a.start.saturating_sub(b.end)
    }
}

/// Parses the category line and the column-name line into ordered columns.
///
/// Phase one collects category label spans; phase two assigns every column
/// name to the span it overlaps most, or the nearest span when it overlaps
/// none. `category_no` and `column_no` are 1-based input line numbers used
/// in error reports.
pub fn parse_header(
    category_line: &str,
    category_no: usize,
    column_line: &str,
    column_no: usize,
) -> Result<Vec<Column>> {
    let mut categories: Vec<(Range<usize>, Category)> = Vec::new();
    for (range, token) in spans(category_line) {
        let category = Category::from_label(token).ok_or_else(|| {
            Error::format(category_no, format!("unrecognized category '{token}' in header"))
        })?;
        if categories.iter().any(|(_, c)| *c == category) {
            return Err(Error::format(
                category_no,
                format!("category '{}' appears twice in header", category.label()),
            ));
        }
        categories.push((range, category));
    }
    if categories.is_empty() {
        return Err(Error::format(category_no, "empty category line"));
    }

    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for (range, name) in spans(column_line) {
        let known = lookup(name).ok_or_else(|| {
            Error::format(column_no, format!("unrecognized column '{name}' in header"))
        })?;
        if !seen.insert(name) {
            return Err(Error::format(column_no, format!("column '{name}' appears twice in header")));
        }

        let placed = categories
            .iter()
            .max_by_key(|(span, _)| (overlap(span, &range), std::cmp::Reverse(gap(span, &range))))
            .map(|(_, c)| *c)
            .ok_or_else(|| Error::format(category_no, "empty category line"))?;
        if placed != known.category {
            return Err(Error::format(
                column_no,
                format!(
                    "column '{name}' sits under '{}' but belongs to '{}'",
                    placed.label(),
                    known.category.label()
                ),
            ));
        }

        columns.push(Column {
            name: name.to_string(),
            category: placed,
            unit: known.unit,
            description: known.description,
        });
    }
    if columns.is_empty() {
        return Err(Error::format(column_no, "empty column-name line"));
    }

    debug!(columns = columns.len(), categories = categories.len(), "parsed vmstat header");
    Ok(columns)
}
