//! Locating the Memberful API key.

use crate::Result;
use camino::Utf8Path;
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::fs;
use std::io;

const LOG_TARGET: &str = "   secrets";

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "MEMBERFUL_API_KEY")]
    api_key: Option<String>,
}

/// Pick the API key from the command line or environment, falling back to the secrets file.
///
/// # Errors
///
/// Returns an error when no key is found anywhere, or when the secrets file exists but can't be parsed.
pub fn resolve_api_key(from_args: Option<&str>, secrets_file: &Utf8Path) -> Result<String> {
    if let Some(key) = from_args.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    let text = match fs::read_to_string(secrets_file) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!(target: LOG_TARGET, "No secrets file at '{secrets_file}'");
            return Err(missing_key(secrets_file));
        }
        Err(e) => return Err(e).into_app_err_with(|| format!("reading secrets file '{secrets_file}'")),
    };

    let secrets: SecretsFile = toml::from_str(&text).into_app_err_with(|| format!("parsing secrets file '{secrets_file}'"))?;
    match secrets.api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        Some(key) => {
            log::debug!(target: LOG_TARGET, "Using API key from '{secrets_file}'");
            Ok(key)
        }
        None => Err(missing_key(secrets_file)),
    }
}

fn missing_key(secrets_file: &Utf8Path) -> ohno::AppError {
    app_err!(
        "no Memberful API key is configured; pass --api-key or set MEMBERFUL_API_KEY, \
         or add MEMBERFUL_API_KEY = \"...\" to '{secrets_file}'"
    )
}
