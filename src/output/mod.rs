//! Output module for reports and store summaries
//!
//! This module handles:
//! - Rendering cycle reports as markdown
//! - Rendering vacancy lists for store queries
//! - Loading and printing store statistics

mod report;
pub mod stats;

pub use report::{format_cycle_report, format_vacancy_list, write_cycle_report};
pub use stats::{load_statistics, print_statistics, StoreStatistics};
