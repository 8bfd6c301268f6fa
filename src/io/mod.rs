//! Input/Output operations for geminal calculations
//!
//! This module handles logging setup and the final solution report.

mod output;

pub use output::{print_solution, setup_output};
