//! Command dispatch logic for memberboard

use super::{
    ActivitiesArgs, InitArgs, MembersArgs, SummaryArgs, init_config, process_activities, process_members, process_summary,
};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};
use std::io::Write;

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "memberboard", version, author, long_about = None)]
#[command(about = "Membership metrics for a Memberful organization")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show headline metrics, revenue and growth series, plans and the MRR waterfall
    Summary(Box<SummaryArgs>),
    /// List members with their plan, join date and status
    Members(Box<MembersArgs>),
    /// List membership activity with its effect on recurring revenue
    Activities(Box<ActivitiesArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if the executed command fails. Argument errors, `--help` and
/// `--version` are printed through the host, which is then asked to exit.
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let code = e.exit_code();
            let text = e.render().to_string();
            if code == 0 {
                let _ = write!(host.output(), "{text}");
            } else {
                let _ = write!(host.error(), "{text}");
            }
            host.exit(code);
            return Ok(());
        }
    };

    match &cli.command {
        Command::Summary(args) => process_summary(host, args).await,
        Command::Members(args) => process_members(host, args).await,
        Command::Activities(args) => process_activities(host, args).await,
        Command::Init(args) => init_config(host, args),
    }
}
