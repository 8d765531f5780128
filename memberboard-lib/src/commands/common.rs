//! Setup and output handling shared by the data commands.

use super::Host;
use super::config::{Config, validate_organization};
use super::secrets::resolve_api_key;
use crate::Result;
use crate::api::{Client, endpoint_for};
use crate::cache::Cache;
use crate::metrics::{BucketSize, TimePeriod};
use crate::records::NormalizeOptions;
use crate::reports::{Report, generate_console, generate_csv, generate_json};
use crate::snapshot::{DashboardContext, FetchOptions, Filters, load_snapshot};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use directories::BaseDirs;
use ohno::{IntoAppError, app_err};
use std::fs;
use std::io::Write;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by every command that talks to Memberful
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Memberful API key
    #[arg(long, value_name = "KEY", env = "MEMBERFUL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Memberful organization, the `<org>` in `<org>.memberful.com`
    #[arg(long, short = 'o', value_name = "ORG")]
    pub organization: Option<String>,

    /// GraphQL endpoint to query instead of the organization's default
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Path to configuration file (default is `memberboard.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Time period to report on
    #[arg(long, short = 'p', value_name = "PERIOD", default_value = "year")]
    pub period: TimePeriod,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Directory where fetched snapshots are cached
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Ignore any cached snapshot and fetch fresh data
    #[arg(long)]
    pub refresh: bool,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,

    /// Write the report to a CSV file instead of to the terminal
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub csv: Option<Utf8PathBuf>,

    /// Write the report to a JSON file instead of to the terminal
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,
}

pub struct Common<'a, H: Host> {
    pub config: Config,
    pub client: Client,
    pub now: DateTime<Utc>,
    host: &'a mut H,
    cache: Cache,
    fetch: FetchOptions,
    color: ColorMode,
    csv: Option<Utf8PathBuf>,
    json: Option<Utf8PathBuf>,
}

impl<'a, H: Host> Common<'a, H> {
    /// Load configuration, resolve credentials and build the API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, no organization or API key is
    /// configured, or the HTTP client can't be created
    pub fn new(host: &'a mut H, args: &CommonArgs) -> Result<Self> {
        init_logging(args.log_level);

        let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;

        let organization = args
            .organization
            .clone()
            .or_else(|| config.organization.clone())
            .ok_or_else(|| app_err!("no organization given; pass --organization or set `organization` in memberboard.toml"))?;
        validate_organization(&organization)?;

        let endpoint = args
            .endpoint
            .clone()
            .or_else(|| config.endpoint.clone())
            .unwrap_or_else(|| endpoint_for(&organization));

        let api_key = resolve_api_key(args.api_key.as_deref(), &config.secrets_file)?;
        let client = Client::new(&api_key, endpoint, config.retry, config.request_timeout).into_app_err("creating the API client")?;

        let cache_dir = if let Some(path) = &args.cache_dir {
            path.clone()
        } else {
            let base = BaseDirs::new().into_app_err("could not determine cache directory")?;
            Utf8PathBuf::from_path_buf(base.cache_dir().join("memberboard"))
                .ok()
                .into_app_err("cache directory is not valid UTF-8")?
        };

        let now = Utc::now();
        let cache = Cache::new(cache_dir, config.snapshot_ttl, now, args.refresh);

        let fetch = FetchOptions {
            organization,
            period: args.period,
            page_size: config.page_size,
            normalize: NormalizeOptions {
                education_coupon: config.education_coupon.clone(),
            },
        };

        Ok(Self {
            config,
            client,
            now,
            host,
            cache,
            fetch,
            color: args.color,
            csv: args.csv.clone(),
            json: args.json.clone(),
        })
    }

    #[must_use]
    pub fn organization(&self) -> &str {
        &self.fetch.organization
    }

    /// Fetch (or reuse) a snapshot and wrap it with the requested filters.
    pub async fn load_context(&self, bucket: BucketSize, horizon_days: Option<u32>) -> Result<DashboardContext> {
        let snapshot = load_snapshot(&self.client, &self.cache, &self.fetch, self.now).await?;

        Ok(DashboardContext::new(
            snapshot,
            Filters {
                period: self.fetch.period,
                now: self.now,
                horizon_days: horizon_days.unwrap_or(self.config.expiring_horizon_days),
                bucket,
            },
        ))
    }

    /// Write `report` to every requested destination.
    ///
    /// The console gets the report unless a file output was requested.
    pub fn emit(&mut self, report: Report<'_>) -> Result<()> {
        if self.csv.is_none() && self.json.is_none() {
            let use_colors = match self.color {
                ColorMode::Always => true,
                ColorMode::Never => false,
                ColorMode::Auto => {
                    use std::io::{IsTerminal, stdout};
                    stdout().is_terminal()
                }
            };

            let mut console_output = String::new();
            generate_console(report, use_colors, &mut console_output)?;
            let _ = write!(self.host.output(), "{console_output}");
        }

        if let Some(filename) = &self.csv {
            let mut csv_output = String::new();
            generate_csv(report, &mut csv_output)?;
            fs::write(filename, csv_output).into_app_err_with(|| format!("writing CSV report '{filename}'"))?;
            let _ = writeln!(self.host.error(), "Wrote {filename}");
        }

        if let Some(filename) = &self.json {
            let mut json_output = String::new();
            generate_json(report, &mut json_output)?;
            fs::write(filename, json_output).into_app_err_with(|| format!("writing JSON report '{filename}'"))?;
            let _ = writeln!(self.host.error(), "Wrote {filename}");
        }

        Ok(())
    }
}

/// Initialize logger based on log level
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a second initialization (as happens across tests) keeps the first logger
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}
