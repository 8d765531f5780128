//! Command-line interface and orchestration for memberboard
//!
//! This module implements the CLI commands and wires the other modules
//! together: configuration and credentials, the API client, the snapshot
//! cache, the metric engine and the report generators.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **summary**: Headline metrics, revenue and growth series, plan mix,
//!   expiring subscriptions and the MRR waterfall
//! - **members**: The member directory
//! - **activities**: The activity log, categorized with its MRR impact
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler. Each data command follows the same pattern:
//!
//! 1. Load configuration and resolve the organization and API key
//! 2. Reuse a cached snapshot or fetch and normalize a fresh one
//! 3. Compute the requested view from a `DashboardContext`
//! 4. Render it to the console, or to CSV and JSON files
//!
//! The `common` module holds the shared setup, logging initialization and
//! output handling.

mod activities;
mod common;
mod config;
mod host;
mod init;
mod members;
mod run;
mod secrets;
mod summary;

#[cfg(debug_assertions)]
pub use config::Config;

pub use activities::{ActivitiesArgs, process_activities};
pub use common::{ColorMode, CommonArgs, LogLevel, init_logging};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use members::{MembersArgs, process_members};
pub use run::run;
pub use secrets::resolve_api_key;
pub use summary::{SummaryArgs, process_summary};
