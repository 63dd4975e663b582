// vmstat_graph - Input Reader and Row Parser
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

//! Reads vmstat text and parses it into a [`Dataset`].

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::config::InputSource;
use crate::error::{Error, Result};
use crate::header::{is_category_line, is_column_line, parse_header, Column};

/// One data line: values in header column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// 1-based input line number
    pub line: usize,
    pub values: Vec<f64>,
}

/// Parsed vmstat capture.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub samples: Vec<Sample>,
}

impl Dataset {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Every sample's value for `name`, in input order.
    pub fn values(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.samples.iter().map(|s| s.values[idx]).collect())
    }
}

/// Reads the whole input before any parsing starts. The file handle is
/// closed when this returns, on success or failure.
pub fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            info!("Reading vmstat output from standard input");
            read_text(io::stdin().lock(), Path::new("<stdin>"))
        }
        InputSource::File(path) => {
            info!("Reading vmstat output from {}", path.display());
            let file = File::open(path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            read_text(file, path)
        }
    }
}

/// Reads `reader` to the end. Bytes that are not UTF-8 are malformed input
/// and reported at the line they sit on.
pub fn read_text<R: Read>(mut reader: R, path: &Path) -> Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(bytes = bytes.len(), "input read");

    String::from_utf8(bytes).map_err(|err| {
        let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        Error::format(line, "input is not valid UTF-8 text")
    })
}

fn parse_row(line: &str, line_no: usize, columns: &[Column]) -> Result<Sample> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != columns.len() {
        return Err(Error::format(
            line_no,
            format!("expected {} fields, found {}", columns.len(), tokens.len()),
        ));
    }
    let values = tokens
        .iter()
        .zip(columns)
        .map(|(token, column)| {
            token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    Error::format(
                        line_no,
                        format!("non-numeric value '{token}' in column '{}'", column.name),
                    )
                })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(Sample { line: line_no, values })
}

/// Parses vmstat text: a category line, a column-name line, then one sample
/// per non-empty line. Header pairs that vmstat reprints further down are
/// skipped, provided they name the same columns.
pub fn parse_dataset(text: &str) -> Result<Dataset> {
    let mut category: Option<(usize, &str)> = None;
    let mut columns: Option<Vec<Column>> = None;
    let mut samples = Vec::new();
    let mut last_line = 0;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        if line.trim().is_empty() {
            continue;
        }

        let Some(known) = columns.as_deref() else {
            if is_category_line(line) {
                category = Some((line_no, line));
            } else if is_column_line(line) {
                let (cat_no, cat_line) = category.ok_or_else(|| {
                    Error::format(line_no, "column-name line without a preceding category line")
                })?;
                columns = Some(parse_header(cat_line, cat_no, line, line_no)?);
            } else {
                return Err(Error::format(
                    line_no,
                    "expected vmstat header ('procs ...' then 'r  b ...')",
                ));
            }
            continue;
        };

        if is_category_line(line) {
            continue;
        }
        if is_column_line(line) {
            if !line.split_whitespace().eq(known.iter().map(|c| c.name.as_str())) {
                return Err(Error::format(line_no, "repeated header lists different columns"));
            }
            continue;
        }
        samples.push(parse_row(line, line_no, known)?);
    }

    let Some(columns) = columns else {
        let reason = if category.is_some() {
            "missing column-name line after category line"
        } else {
            "missing vmstat header (category line and column-name line)"
        };
        return Err(Error::format(last_line.max(1), reason));
    };
    if samples.is_empty() {
        return Err(Error::format(last_line, "no samples after header"));
    }

    info!("Parsed {} samples of {} columns", samples.len(), columns.len());
    Ok(Dataset { columns, samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Category;
    use std::path::PathBuf;

    const CAPTURE: &str = "procs -----------memory---------- ---swap-- -----io---- -system-- ------cpu-----
 r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st
 2  0      0 5075832  29076 6839980    0    0    33   873 2669 5057  5  8 83  4  0
 1  0      0 5075100  29076 6840012    0    0     0    12 1880 3012  2  1 97  0  0
";

    #[test]
    fn parses_samples_in_order() {
        let data = parse_dataset(CAPTURE).unwrap();
        assert_eq!(data.columns.len(), 17);
        assert_eq!(data.samples.len(), 2);
        assert_eq!(data.samples[0].line, 3);
        assert_eq!(data.values("free").unwrap(), vec![5075832.0, 5075100.0]);
        assert_eq!(data.column("cache").unwrap().category, Category::Memory);
        assert_eq!(data.samples[0].values[0], 2.0);
        assert_eq!(data.column_index("st"), Some(16));
    }

    #[test]
    fn accepts_floats_and_blank_lines() {
        let text = CAPTURE.replace(" 5  8 83", " 5.5  8 83") + "\n\n";
        let data = parse_dataset(&text).unwrap();
        assert_eq!(data.values("us").unwrap()[0], 5.5);
    }

    #[test]
    fn skips_repeated_headers() {
        let mut text = CAPTURE.to_string();
        text.push_str(CAPTURE.lines().take(2).collect::<Vec<_>>().join("\n").as_str());
        text.push_str("\n 3  1      0 5075000  29076 6840100    0    0     0     0 1700 2900  1  1 98  0  0\n");
        let data = parse_dataset(&text).unwrap();
        assert_eq!(data.samples.len(), 3);
        assert_eq!(data.samples[2].line, 7);
    }

    #[test]
    fn wrong_token_count_names_the_line() {
        let text = CAPTURE.to_string() + " 1  0      0 5075100  29076\n";
        let err = parse_dataset(&text).unwrap_err();
        assert!(matches!(err, Error::Format { line: 5, .. }), "{err}");
    }

    #[test]
    fn non_numeric_token_is_reported() {
        let text = CAPTURE.replace("5057", "50x7");
        let err = parse_dataset(&text).unwrap_err();
        assert!(matches!(err, Error::Format { line: 3, .. }));
        assert!(err.to_string().contains("50x7"));
        assert!(err.to_string().contains("'cs'"));
    }

    #[test]
    fn missing_header() {
        assert!(matches!(parse_dataset(""), Err(Error::Format { line: 1, .. })));
        let only_categories = CAPTURE.lines().next().unwrap();
        assert!(parse_dataset(only_categories).is_err());
        let no_categories: String = CAPTURE.lines().skip(1).collect::<Vec<_>>().join("\n");
        assert!(matches!(parse_dataset(&no_categories), Err(Error::Format { line: 1, .. })));
    }

    #[test]
    fn header_without_samples() {
        let header: String = CAPTURE.lines().take(2).collect::<Vec<_>>().join("\n");
        let err = parse_dataset(&header).unwrap_err();
        assert!(err.to_string().contains("no samples"));
    }

    #[test]
    fn reads_file_input() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CAPTURE.as_bytes()).unwrap();
        let text = read_input(&InputSource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(text, CAPTURE);
    }

    #[test]
    fn reads_any_reader() {
        let text = read_text(io::Cursor::new(CAPTURE.as_bytes()), Path::new("<stdin>")).unwrap();
        assert_eq!(parse_dataset(&text).unwrap().samples.len(), 2);
    }

    #[test]
    fn invalid_utf8_is_a_format_error() {
        let mut bytes = CAPTURE.as_bytes().to_vec();
        bytes.extend_from_slice(b" 1  0  \xff\xfe 5075100\n");
        let err = read_text(io::Cursor::new(bytes), Path::new("capture.log")).unwrap_err();
        assert!(matches!(err, Error::Format { line: 5, .. }), "{err}");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_input(&InputSource::File(PathBuf::from("/nonexistent/vmstat.log"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
