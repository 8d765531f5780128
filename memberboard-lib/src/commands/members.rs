use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::metrics::{BucketSize, member_directory};
use crate::reports::Report;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct MembersArgs {
    /// Only list members whose latest subscription is active
    #[arg(long)]
    pub active: bool,

    /// Only list education members
    #[arg(long)]
    pub education: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn process_members<H: Host>(host: &mut H, args: &MembersArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;
    let context = common.load_context(BucketSize::default(), None).await?;

    let entries: Vec<_> = member_directory(context.records(), common.organization())
        .into_iter()
        .filter(|entry| !args.active || entry.active)
        .filter(|entry| !args.education || entry.education)
        .collect();

    common.emit(Report::Directory(&entries))
}
