//! Report generation for dashboard results
//!
//! This module turns computed metrics into output for people and for other
//! programs.
//!
//! # Implementation Model
//!
//! [`DashboardSummary::build`] computes every dashboard section from a
//! `DashboardContext` in one pass. The result is a plain value, so the same
//! summary can be rendered several times in different formats.
//!
//! Three report generators are provided, each accessed through a `generate` function:
//! - **Console**: Aligned terminal output, optionally colored
//! - **CSV**: One row per metric, member or activity, written with the `csv` crate
//! - **JSON**: The complete structure, for programmatic use
//!
//! Every generator accepts a [`Report`], which selects between the dashboard
//! summary, the member directory and the activity log, and writes into any
//! `core::fmt::Write` sink.

mod common;
mod console;
mod csv;
mod dashboard_summary;
mod json;

#[cfg(test)]
mod test_support;

use crate::metrics::DirectoryEntry;

pub use console::generate as generate_console;
pub use csv::generate as generate_csv;
pub use dashboard_summary::{ActivityRow, CategoryCount, DashboardSummary, ExpiringEntry, PlanRow, activity_rows};
pub use json::generate as generate_json;

/// What to render.
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    Summary(&'a DashboardSummary),
    Directory(&'a [DirectoryEntry]),
    Activities(&'a [ActivityRow]),
}
