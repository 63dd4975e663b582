// vmstat_graph - Command Line and Run Configuration
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

//! Command-line arguments and the immutable configuration handed to every
//! pipeline stage.

use std::num::NonZeroU64;
use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{ArgAction, Parser};
use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::header::{is_known_column, known_columns};
use crate::VERSION_NUMBER;

pub const DEFAULT_TITLE: &str = "Graph of vmstat output";
pub const DEFAULT_SIZE: (u32, u32) = (1024, 600);

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

static SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*([A-Za-z]*)\s*$").expect("size pattern"));

/// Graph vmstat output.
#[derive(Parser, Debug)]
#[command(
    name = "vmstat_graph",
    version = VERSION_NUMBER,
    about = "Graph vmstat output",
    after_help = "Examples:
    vmstat 5 720 > vmstat.log
    vmstat_graph -s vmstat.svg -t 5 -r 16GB vmstat.log
    vmstat 1 60 | vmstat_graph -d -l -c si,so,bi,bo"
)]
pub struct Args {
    /// File with vmstat output, none or "-" means read from standard input
    #[arg(value_name = "FILENAME")]
    pub file: Option<PathBuf>,

    /// Use a logarithmic Y axis
    #[arg(short = 'l', long)]
    pub logarithmic: bool,

    /// Display the chart in the system SVG viewer
    #[arg(short = 'd', long)]
    pub display: bool,

    /// Save the chart to an SVG image file
    #[arg(short = 's', long = "svg", value_name = "FILENAME", visible_alias = "plot", short_alias = 'p')]
    pub svg: Option<PathBuf>,

    /// Sampling interval in seconds, turns the X axis into elapsed time
    #[arg(short = 't', long = "time", value_name = "INTEGER")]
    pub time: Option<String>,

    /// Total RAM size to normalize memory columns to percent.
    /// A bare number is MB; GB, MB, KB suffixes are accepted
    #[arg(short = 'r', long = "ram", value_name = "SIZE")]
    pub ram: Option<String>,

    /// Comma-separated list of columns, defaults to all columns
    #[arg(short = 'c', long = "columns", value_name = "STRING")]
    pub columns: Option<String>,

    /// Chart title
    #[arg(long, value_name = "STRING", default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Chart size in pixels
    #[arg(long, value_name = "WxH", default_value = "1024x600")]
    pub size: String,

    /// Print min/avg/max of every plotted column
    #[arg(long)]
    pub summary: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    pub fn from_arg(arg: Option<PathBuf>) -> Self {
        match arg {
            Some(path) if path.as_os_str() != "-" => InputSource::File(path),
            _ => InputSource::Stdin,
        }
    }
}

/// Where the finished chart goes. At least one target is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMode {
    pub display: bool,
    pub svg: Option<PathBuf>,
}

impl OutputMode {
    pub fn new(display: bool, svg: Option<PathBuf>) -> Result<Self> {
        if !display && svg.is_none() {
            return Err(Error::config(
                "nothing to do: request --display and/or --svg FILENAME",
            ));
        }
        Ok(Self { display, svg })
    }

    pub fn svg(path: impl Into<PathBuf>) -> Self {
        Self {
            display: false,
            svg: Some(path.into()),
        }
    }
}

/// Validated options for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub input: InputSource,
    pub output: OutputMode,
    pub logarithmic: bool,
    /// Seconds between samples
    pub interval: Option<NonZeroU64>,
    pub ram_bytes: Option<NonZeroU64>,
    /// None plots every column
    pub columns: Option<Vec<String>>,
    pub title: String,
    pub size: (u32, u32),
    pub summary: bool,
}

impl PlotConfig {
    pub fn new(output: OutputMode) -> Self {
        Self {
            input: InputSource::Stdin,
            output,
            logarithmic: false,
            interval: None,
            ram_bytes: None,
            columns: None,
            title: DEFAULT_TITLE.to_string(),
            size: DEFAULT_SIZE,
            summary: false,
        }
    }
}

impl Args {
    /// Validates the arguments without touching the input.
    ///
    /// The output target is checked first so a run with nothing to produce
    /// fails before anything else is looked at.
    pub fn into_config(self) -> Result<PlotConfig> {
        let output = OutputMode::new(self.display, self.svg)?;

        let interval = self.time.as_deref().map(parse_interval).transpose()?;
        let ram_bytes = self.ram.as_deref().map(parse_size).transpose()?;
        if let Some(ram) = ram_bytes {
            info!("Total RAM (MB): {}", ram.get() / MIB);
        }
        let columns = self.columns.as_deref().map(parse_column_list).transpose()?;
        let size = parse_dimensions(&self.size)?;

        let config = PlotConfig {
            input: InputSource::from_arg(self.file),
            output,
            logarithmic: self.logarithmic,
            interval,
            ram_bytes,
            columns,
            title: self.title,
            size,
            summary: self.summary,
        };
        debug!(?config, "configuration");
        Ok(config)
    }
}

/// Parses a RAM size such as `16GB`, `512mb`, `2048KB` or `100` into bytes.
///
/// Suffixes are binary multiples and case-insensitive; `K`, `M`, `G` may
/// omit the trailing `B` or use `o` (octets). A bare number is megabytes.
pub fn parse_size(input: &str) -> Result<NonZeroU64> {
    let bad = || Error::config(format!("cannot understand RAM size '{input}' (e.g. 16GB, 512MB, 2048KB)"));

    let caps = SIZE.captures(input).ok_or_else(bad)?;
    let number: u64 = caps[1].parse().map_err(|_| bad())?;
    let multiplier = match caps[2].to_ascii_uppercase().as_str() {
        "" => MIB,
        "B" | "O" => 1,
        "K" | "KB" | "KO" => KIB,
        "M" | "MB" | "MO" => MIB,
        "G" | "GB" | "GO" => GIB,
        _ => return Err(bad()),
    };
    let bytes = number.checked_mul(multiplier).ok_or_else(bad)?;
    NonZeroU64::new(bytes).ok_or_else(|| Error::config(format!("RAM size '{input}' must be greater than zero")))
}

/// Sampling interval in whole seconds, greater than zero.
pub fn parse_interval(input: &str) -> Result<NonZeroU64> {
    input
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| Error::config(format!("time interval '{input}' must be a positive integer")))
}

/// Splits a comma-separated column list, rejecting names vmstat never prints.
/// Repeated names are kept once.
pub fn parse_column_list(input: &str) -> Result<Vec<String>> {
    let mut columns: Vec<String> = Vec::new();
    for name in input.split(',').map(str::trim) {
        if name.is_empty() {
            return Err(Error::config(format!("empty column name in '{input}'")));
        }
        if !is_known_column(name) {
            let valid: Vec<&str> = known_columns().collect();
            return Err(Error::config(format!(
                "unknown column '{name}' (valid: {})",
                valid.join(",")
            )));
        }
        if !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    Ok(columns)
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_dimensions(input: &str) -> Result<(u32, u32)> {
    let bad = || Error::config(format!("chart size '{input}' must look like 1024x600"));
    let (w, h) = input.trim().split_once(['x', 'X']).ok_or_else(bad)?;
    let w: u32 = w.trim().parse().map_err(|_| bad())?;
    let h: u32 = h.trim().parse().map_err(|_| bad())?;
    if w == 0 || h == 0 {
        return Err(bad());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("vmstat_graph").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn size_suffixes() {
        assert_eq!(parse_size("1GB").unwrap().get(), 1_073_741_824);
        assert_eq!(parse_size("512MB").unwrap().get(), 536_870_912);
        assert_eq!(parse_size("2048KB").unwrap().get(), 2_097_152);
        assert_eq!(parse_size("100").unwrap().get(), 104_857_600);
        assert_eq!(parse_size("16gb").unwrap().get(), 16 * GIB);
        assert_eq!(parse_size("8G").unwrap().get(), 8 * GIB);
        assert_eq!(parse_size("4Go").unwrap().get(), 4 * GIB);
        assert_eq!(parse_size(" 64 Mb ").unwrap().get(), 64 * MIB);
    }

    #[test]
    fn size_rejects_garbage() {
        for bad in ["abc", "-5GB", "1.5GB", "0", "0KB", "12TB", "", "GB", "99999999999999999999"] {
            assert!(matches!(parse_size(bad), Err(Error::Config(_))), "accepted {bad:?}");
        }
    }

    #[test]
    fn interval_must_be_positive() {
        assert_eq!(parse_interval("5").unwrap().get(), 5);
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("-2").is_err());
        assert!(parse_interval("1.5").is_err());
    }

    #[test]
    fn column_list() {
        assert_eq!(parse_column_list("free, buff,free").unwrap(), vec!["free", "buff"]);
        let err = parse_column_list("free,bogus").unwrap_err();
        assert!(err.to_string().contains("bogus"));
        assert!(parse_column_list("free,,buff").is_err());
    }

    #[test]
    fn dimensions() {
        assert_eq!(parse_dimensions("800x400").unwrap(), (800, 400));
        assert!(parse_dimensions("800").is_err());
        assert!(parse_dimensions("0x400").is_err());
    }

    #[test]
    fn no_output_target_is_a_config_error() {
        let err = args(&["vmstat.log"]).into_config().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn output_check_runs_before_other_validation() {
        let err = args(&["-r", "abc", "vmstat.log"]).into_config().unwrap_err();
        assert!(err.to_string().contains("nothing to do"));
    }

    #[test]
    fn full_command_line() {
        let config = args(&["-l", "-s", "out.svg", "-t", "2", "-r", "1GB", "-c", "free,si", "-"])
            .into_config()
            .unwrap();
        assert_eq!(config.input, InputSource::Stdin);
        assert!(config.logarithmic);
        assert_eq!(config.output.svg, Some(PathBuf::from("out.svg")));
        assert!(!config.output.display);
        assert_eq!(config.interval.map(NonZeroU64::get), Some(2));
        assert_eq!(config.ram_bytes.map(NonZeroU64::get), Some(GIB));
        assert_eq!(config.columns, Some(vec!["free".to_string(), "si".to_string()]));
        assert_eq!(config.size, DEFAULT_SIZE);
    }

    #[test]
    fn plot_alias_and_file_input() {
        let config = args(&["-p", "out.svg", "-d", "capture.log"]).into_config().unwrap();
        assert!(config.output.display);
        assert_eq!(config.input, InputSource::File(PathBuf::from("capture.log")));
    }

    #[test]
    fn missing_filename_means_stdin() {
        let config = args(&["-d"]).into_config().unwrap();
        assert_eq!(config.input, InputSource::Stdin);
    }
}
