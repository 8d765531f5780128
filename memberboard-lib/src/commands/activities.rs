use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::metrics::{ActivityCategory, BucketSize};
use crate::reports::{Report, activity_rows};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ActivitiesArgs {
    /// Hide activities that don't affect recurring revenue
    #[arg(long)]
    pub revenue_only: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

const fn affects_revenue(category: ActivityCategory) -> bool {
    matches!(
        category,
        ActivityCategory::NewMembers
            | ActivityCategory::Reactivations
            | ActivityCategory::Upgrades
            | ActivityCategory::Downgrades
            | ActivityCategory::Cancellations
            | ActivityCategory::FailedPayments
    )
}

pub async fn process_activities<H: Host>(host: &mut H, args: &ActivitiesArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;
    let context = common.load_context(BucketSize::default(), None).await?;

    let rows: Vec<_> = activity_rows(&context)
        .into_iter()
        .filter(|row| !args.revenue_only || affects_revenue(row.category))
        .collect();

    common.emit(Report::Activities(&rows))
}
