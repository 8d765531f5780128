use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::metrics::BucketSize;
use crate::reports::{DashboardSummary, Report};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct SummaryArgs {
    /// Width of the time-series buckets
    #[arg(long, short = 'b', value_name = "SIZE", default_value = "month")]
    pub bucket: BucketSize,

    /// Days ahead to look for expiring subscriptions (overrides the configuration)
    #[arg(long, value_name = "DAYS", value_parser = clap::value_parser!(u32).range(1..=365))]
    pub horizon_days: Option<u32>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn process_summary<H: Host>(host: &mut H, args: &SummaryArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;
    let context = common.load_context(args.bucket, args.horizon_days).await?;
    let summary = DashboardSummary::build(&context);

    common.emit(Report::Summary(&summary))
}
