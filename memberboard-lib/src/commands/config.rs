use crate::Result;
use crate::api::RetryPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "memberboard.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Memberful organization subdomain
    #[serde(default)]
    pub organization: Option<String>,

    /// GraphQL endpoint overriding the one derived from the organization
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Retry behavior for transient failures
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Timeout for each HTTP request attempt
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// How long a cached snapshot stays fresh
    #[serde(default = "default_snapshot_ttl", with = "humantime_serde")]
    pub snapshot_ttl: Duration,

    /// Days ahead considered by the expiring-soon list
    #[serde(default = "default_expiring_horizon_days")]
    pub expiring_horizon_days: u32,

    /// Coupon code marking free education enrollments
    #[serde(default = "default_education_coupon")]
    pub education_coupon: String,

    /// Local file holding the API key
    #[serde(default = "default_secrets_file")]
    pub secrets_file: Utf8PathBuf,
}

const fn default_page_size() -> u32 {
    100
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_snapshot_ttl() -> Duration {
    Duration::from_secs(15 * 60)
}

const fn default_expiring_horizon_days() -> u32 {
    30
}

fn default_education_coupon() -> String {
    "Education".to_string()
}

fn default_secrets_file() -> Utf8PathBuf {
    Utf8PathBuf::from(".memberboard/secrets.toml")
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `memberboard.toml` in `base_dir` is used when it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file already exists or cannot be written
    pub fn save_default(output_path: &Utf8Path, force: bool) -> Result<()> {
        if !force && output_path.exists() {
            return Err(app_err!("'{output_path}' already exists, use --force to overwrite it"));
        }

        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Check values the type system can't express.
    fn validate(&self) -> Result<()> {
        if !(1..=crate::api::MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(app_err!(
                "page_size must be between 1 and {}, got {}",
                crate::api::MAX_PAGE_SIZE,
                self.page_size
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        if self.retry.base_delay > self.retry.max_delay {
            return Err(app_err!(
                "retry.base_delay ({:?}) must not exceed retry.max_delay ({:?})",
                self.retry.base_delay,
                self.retry.max_delay
            ));
        }

        if !(1..=365).contains(&self.expiring_horizon_days) {
            return Err(app_err!(
                "expiring_horizon_days must be between 1 and 365, got {}",
                self.expiring_horizon_days
            ));
        }

        if self.education_coupon.trim().is_empty() {
            return Err(app_err!("education_coupon must not be empty"));
        }

        if let Some(org) = &self.organization {
            validate_organization(org)?;
        }

        Ok(())
    }
}

/// Organizations become part of a hostname, so only letters, digits and dashes are allowed.
pub fn validate_organization(org: &str) -> Result<()> {
    if org.is_empty() || !org.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(app_err!(
            "organization '{org}' is not valid; use the subdomain from <org>.memberful.com"
        ));
    }

    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
