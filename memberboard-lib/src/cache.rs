//! Short-lived JSON file cache for fetched snapshots.
//!
//! Entries are stored as `<key>.json` inside the cache directory, wrapped in an
//! envelope recording when they were written. An entry older than the TTL is a
//! miss, as is any entry that can't be read back.

use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use strum::Display;

const LOG_TARGET: &str = "     cache";

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    Hit { data: T, stored_at: DateTime<Utc> },
    Miss(MissReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MissReason {
    Bypassed,
    Absent,
    Unreadable,
    Expired,
}

#[derive(Debug, Deserialize, Serialize)]
struct Envelope<T> {
    stored_at: DateTime<Utc>,
    data: T,
}

/// A directory of TTL-bound JSON entries.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: Utf8PathBuf,
    ttl: Duration,
    now: DateTime<Utc>,
    bypass: bool,
}

impl Cache {
    /// Create a cache rooted at `dir`. With `bypass` set every lookup misses, but saves still happen.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>, ttl: Duration, now: DateTime<Utc>, bypass: bool) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            now,
            bypass,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Utf8PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up `key`.
    #[must_use]
    pub fn load<T>(&self, key: &str) -> CacheLookup<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        if self.bypass {
            log::debug!(target: LOG_TARGET, "Bypassing cache for {key}");
            return CacheLookup::Miss(MissReason::Bypassed);
        }

        let path = self.path_for(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Cache miss for {key}: {e}");
                return CacheLookup::Miss(MissReason::Absent);
            }
        };

        let envelope: Envelope<T> = match serde_json::from_reader(BufReader::new(file)) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Ignoring unreadable cache entry '{path}': {e}");
                return CacheLookup::Miss(MissReason::Unreadable);
            }
        };

        // an entry from the future (clock skew) counts as fresh
        let age = self.now.signed_duration_since(envelope.stored_at).to_std().unwrap_or_default();
        if age >= self.ttl {
            log::debug!(target: LOG_TARGET, "Cache entry {key} expired ({}s old, TTL {}s)", age.as_secs(), self.ttl.as_secs());
            return CacheLookup::Miss(MissReason::Expired);
        }

        log::info!(target: LOG_TARGET, "Using cached {key} from {}", envelope.stored_at.format("%Y-%m-%d %H:%M UTC"));
        CacheLookup::Hit {
            data: envelope.data,
            stored_at: envelope.stored_at,
        }
    }

    /// Store `data` under `key`, replacing any previous entry.
    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).into_app_err_with(|| format!("creating cache directory '{}'", self.dir))?;

        let path = self.path_for(key);
        let file = File::create(&path).into_app_err_with(|| format!("creating cache file '{path}'"))?;
        let mut writer = BufWriter::new(file);
        let envelope = Envelope {
            stored_at: self.now,
            data,
        };

        #[cfg(debug_assertions)]
        let result = serde_json::to_writer_pretty(&mut writer, &envelope);
        #[cfg(not(debug_assertions))]
        let result = serde_json::to_writer(&mut writer, &envelope);

        result.into_app_err_with(|| format!("writing cache file '{path}'"))?;
        writer
            .flush()
            .into_app_err_with(|| format!("flushing cache file '{path}'"))?;

        log::debug!(target: LOG_TARGET, "Saved {key} to '{path}'");
        Ok(())
    }
}

/// Turn arbitrary query parameters into a file-name-safe cache key.
#[must_use]
pub fn cache_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| {
            part.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c.to_ascii_lowercase() } else { '_' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}
