// vmstat_graph - Library Root
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

//! # vmstat_graph
//!
//! Parses captured `vmstat` output and charts the selected columns as SVG.
//!
//! The stages run once, in order: [`parse::read_input`],
//! [`parse::parse_dataset`], [`select::select_columns`],
//! [`normalize::build_series`], [`render::render`]. Each takes the
//! immutable [`config::PlotConfig`] or plain values, so every stage can be
//! driven on its own.

pub mod config;
pub mod error;
pub mod header;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod select;
pub mod summary;

// Increment as tool evolves
pub const VERSION_NUMBER: &str = "1.0.0";

pub use config::{Args, PlotConfig};
pub use error::{Error, Result};
