//! Input/Output operations for SCF calculations
//!
//! This module handles logging setup and result tables.

mod output;

pub use output::{setup_output, write_series_table, SeriesEntry};
