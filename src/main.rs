// vmstat_graph - Graph vmstat Output (Main Entry)
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
    # main.rs

    Command-line front end for vmstat_graph:
    - `-s <file.svg>`: write the chart to an SVG file
    - `-d`: open the chart in the system viewer
    - `-l`, `-t`, `-r`, `-c`: log scale, elapsed time, RAM percent, column subset
    - `-h`: help/usage

    Exit status is 0 on success, otherwise the error's own non-zero code.
*/

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vmstat_graph::{pipeline, Args};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = match args.into_config().and_then(|config| pipeline::run(&config)) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("ERROR: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
