use super::{Report, common};
use crate::Result;
use core::fmt::Write;
use ohno::{IntoAppError, app_err};

pub fn generate<W: Write>(report: Report<'_>, writer: &mut W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(Vec::new());

    match report {
        Report::Summary(summary) => {
            csv.write_record(["category", "metric", "description", "value"])?;
            for metric in &summary.metrics {
                let value = metric.value.as_ref().map(ToString::to_string).unwrap_or_default();
                csv.write_record([metric.category().to_string().as_str(), metric.name(), metric.description(), &value])?;
            }
        }

        Report::Directory(entries) => {
            csv.write_record(["id", "name", "email", "joined", "plan", "active", "education", "profile_url"])?;
            for entry in entries {
                csv.write_record([
                    entry.id.as_str(),
                    &entry.name,
                    &entry.email,
                    &entry.joined.map(|at| at.format("%Y-%m-%d").to_string()).unwrap_or_default(),
                    entry.plan.as_deref().unwrap_or_default(),
                    common::yes_no(entry.active),
                    common::yes_no(entry.education),
                    &entry.profile_url,
                ])?;
            }
        }

        Report::Activities(rows) => {
            csv.write_record(["timestamp", "type", "category", "member", "email", "plan", "mrr_impact"])?;
            for row in rows {
                csv.write_record([
                    row.at.to_rfc3339().as_str(),
                    &row.kind,
                    &row.category.to_string(),
                    &row.member,
                    &row.email,
                    &row.plan,
                    &format!("{:.2}", row.mrr_impact),
                ])?;
            }
        }
    }

    let bytes = csv.into_inner().map_err(|e| app_err!("flushing CSV output: {}", e.error()))?;
    let text = String::from_utf8(bytes).into_app_err("CSV output is not valid UTF-8")?;
    writer.write_str(&text)?;
    Ok(())
}
