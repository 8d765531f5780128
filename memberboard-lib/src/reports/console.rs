use super::{ActivityRow, DashboardSummary, Report, common};
use crate::Result;
use crate::metrics::{DirectoryEntry, MetricCategory};
use core::fmt::Write;
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;

pub fn generate<W: Write>(report: Report<'_>, use_colors: bool, writer: &mut W) -> Result<()> {
    let style = Style { use_colors };
    match report {
        Report::Summary(summary) => write_summary(summary, style, writer),
        Report::Directory(entries) => write_directory(entries, style, writer),
        Report::Activities(rows) => write_activities(rows, style, writer),
    }
}

#[derive(Clone, Copy)]
struct Style {
    use_colors: bool,
}

impl Style {
    fn heading<W: Write>(self, writer: &mut W, text: &str) -> Result<()> {
        writeln!(writer)?;
        if self.use_colors {
            writeln!(writer, "{}", text.bold())?;
        } else {
            writeln!(writer, "{text}")?;
        }
        Ok(())
    }

    fn change(self, change: i64) -> String {
        let text = common::format_change(change);
        if !self.use_colors {
            return text;
        }

        match change.signum() {
            1 => text.green().to_string(),
            -1 => text.red().to_string(),
            _ => text,
        }
    }

    fn money_change(self, amount: f64) -> String {
        let text = common::format_money(amount);
        if !self.use_colors || amount.abs() < f64::EPSILON {
            return text;
        }

        if amount > 0.0 { text.green().to_string() } else { text.red().to_string() }
    }
}

fn write_summary<W: Write>(summary: &DashboardSummary, style: Style, writer: &mut W) -> Result<()> {
    let title = format!("{} membership: {} ({})", summary.organization, summary.period, summary.range);
    if style.use_colors {
        writeln!(writer, "{}", title.bold().underline())?;
    } else {
        writeln!(writer, "{title}")?;
    }
    writeln!(writer, "Data fetched {}", summary.fetched_at.format("%Y-%m-%d %H:%M UTC"))?;

    let by_category = common::group_metrics_by_category(&summary.metrics);
    for category in MetricCategory::iter() {
        let Some(metrics) = by_category.get(&category) else {
            continue;
        };

        style.heading(writer, &category.to_string())?;
        let width = metrics.iter().map(|m| m.description().len()).max().unwrap_or(0);
        for metric in metrics {
            let value = metric.value.as_ref().map_or_else(|| "n/a".to_string(), ToString::to_string);
            writeln!(writer, "  {:<width$} : {value}", metric.description())?;
        }
    }

    style.heading(writer, &format!("Revenue by {}", summary.bucket))?;
    for bucket in &summary.revenue {
        writeln!(
            writer,
            "  {}  {:>12}  {:>4} order(s)",
            bucket.period.start.format("%Y-%m-%d"),
            common::format_money(bucket.total),
            bucket.orders
        )?;
    }

    style.heading(writer, "Membership growth")?;
    for point in &summary.growth {
        writeln!(writer, "  {}  {:>6}", point.at.format("%Y-%m-%d"), point.members)?;
    }

    style.heading(writer, "Plans")?;
    if summary.plans.is_empty() {
        writeln!(writer, "  No active plans")?;
    }
    for row in &summary.plans {
        writeln!(
            writer,
            "  {:<30} {:>5} account(s) ({})  {:>5} member(s) ({})",
            row.usage.name,
            row.usage.accounts,
            style.change(row.accounts_change),
            row.usage.members,
            style.change(row.members_change)
        )?;
    }

    style.heading(writer, "MRR movement")?;
    for month in &summary.waterfall {
        writeln!(
            writer,
            "  {}  start {:>10}  new {}  reactivated {}  upgrades {}  downgrades {}  cancelled {}  failed {}  end {:>10}",
            month.label(),
            common::format_money(month.starting),
            style.money_change(month.new_members),
            style.money_change(month.reactivations),
            style.money_change(month.upgrades),
            style.money_change(month.downgrades),
            style.money_change(month.cancellations),
            style.money_change(month.failed_payments),
            common::format_money(month.total)
        )?;
    }

    if !summary.activity_counts.is_empty() {
        style.heading(writer, "Activity")?;
        for entry in &summary.activity_counts {
            writeln!(writer, "  {:<24} {:>5}", entry.category.to_string(), entry.count)?;
        }
    }

    style.heading(writer, &format!("Expiring in the next {} days", summary.headline.horizon_days))?;
    if summary.expiring.is_empty() {
        writeln!(writer, "  Nothing expiring")?;
    }
    for entry in &summary.expiring {
        writeln!(
            writer,
            "  {}  {} <{}>  {}",
            common::format_date(entry.expires_at),
            entry.name,
            entry.email,
            entry.plan
        )?;
    }

    Ok(())
}

fn write_directory<W: Write>(entries: &[DirectoryEntry], style: Style, writer: &mut W) -> Result<()> {
    if entries.is_empty() {
        writeln!(writer, "No members")?;
        return Ok(());
    }

    let name_width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0).max(4);
    let email_width = entries.iter().map(|e| e.email.len()).max().unwrap_or(0).max(5);

    let header = format!("{:<name_width$}  {:<email_width$}  {:<10}  {:<6}  {:<9}  Plan", "Name", "Email", "Joined", "Active", "Education");
    if style.use_colors {
        writeln!(writer, "{}", header.bold())?;
    } else {
        writeln!(writer, "{header}")?;
    }

    for entry in entries {
        writeln!(
            writer,
            "{:<name_width$}  {:<email_width$}  {:<10}  {:<6}  {:<9}  {}",
            entry.name,
            entry.email,
            common::format_date(entry.joined),
            common::yes_no(entry.active),
            common::yes_no(entry.education),
            entry.plan.as_deref().unwrap_or("-")
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "{} member(s)", entries.len())?;
    Ok(())
}

fn write_activities<W: Write>(rows: &[ActivityRow], style: Style, writer: &mut W) -> Result<()> {
    if rows.is_empty() {
        writeln!(writer, "No activity in this period")?;
        return Ok(());
    }

    for row in rows {
        writeln!(
            writer,
            "{}  {:<24} {:<28} {:<24} {}",
            row.at.format("%Y-%m-%d %H:%M"),
            row.category.to_string(),
            row.member,
            row.plan,
            style.money_change(row.mrr_impact)
        )?;
    }

    Ok(())
}
