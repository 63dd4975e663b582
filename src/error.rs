// vmstat_graph - Error Types
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

//! Error types shared by every pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vmstat_graph operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed vmstat input
    #[error("line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// Invalid or contradictory command-line options
    #[error("{0}")]
    Config(String),

    /// Input could not be opened or read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Plotting backend or viewer failure
    #[error("rendering failed: {0}")]
    Render(String),
}

impl Error {
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Process exit status for this error. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Format { .. } => 3,
            Error::Io { .. } => 4,
            Error::Render(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_names_the_line() {
        let err = Error::format(7, "expected 17 fields, found 16");
        assert_eq!(err.to_string(), "line 7: expected 17 fields, found 16");
    }

    #[test]
    fn exit_codes_are_distinct_and_non_zero() {
        let codes = [
            Error::config("x").exit_code(),
            Error::format(1, "x").exit_code(),
            Error::Io {
                path: PathBuf::from("f"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            }
            .exit_code(),
            Error::render("x").exit_code(),
        ];
        assert!(codes.iter().all(|&c| c != 0));
        let mut dedup = codes.to_vec();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), codes.len());
    }
}
