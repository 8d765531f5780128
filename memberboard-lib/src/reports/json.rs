use super::{ActivityRow, Report};
use crate::Result;
use crate::metrics::DirectoryEntry;
use core::fmt::Write;
use serde::Serialize;

#[derive(Serialize)]
struct Members<'a> {
    members: &'a [DirectoryEntry],
}

#[derive(Serialize)]
struct Activities<'a> {
    activities: &'a [ActivityRow],
}

/// Fields are written in declaration order.
pub fn generate<W: Write>(report: Report<'_>, writer: &mut W) -> Result<()> {
    let text = match report {
        Report::Summary(summary) => serde_json::to_string_pretty(summary)?,
        Report::Directory(members) => serde_json::to_string_pretty(&Members { members })?,
        Report::Activities(activities) => serde_json::to_string_pretty(&Activities { activities })?,
    };

    writeln!(writer, "{text}")?;
    Ok(())
}
