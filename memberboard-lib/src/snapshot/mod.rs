//! Fetched data and the user's view of it
//!
//! A [`Snapshot`] is one complete, normalized fetch from the API. A
//! [`DashboardContext`] pairs a snapshot with the [`Filters`] the user picked
//! and is passed explicitly to everything that builds reports.
//!
//! Snapshots are cached on disk, keyed by organization and time period, so that
//! repeated runs within the cache TTL don't hit the API again.

use crate::Result;
use crate::api::{Client, FetchError};
use crate::cache::{Cache, CacheLookup, cache_key};
use crate::metrics::{BucketSize, Period, TimePeriod};
use crate::records::{NormalizeOptions, Records, normalize_snapshot};
use chrono::{DateTime, Utc};
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "  snapshot";

/// One normalized fetch.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    pub organization: String,
    pub fetched_at: DateTime<Utc>,

    /// The window activities were fetched for.
    pub period: TimePeriod,
    pub records: Records,
}

impl Snapshot {
    /// The oldest timestamp found anywhere in the records.
    #[must_use]
    pub fn earliest_record(&self) -> Option<DateTime<Utc>> {
        let records = &self.records;
        records
            .members
            .iter()
            .filter_map(|m| m.created_at)
            .chain(records.subscriptions.iter().map(|s| s.created_at))
            .chain(records.orders.iter().map(|o| o.created_at))
            .chain(records.activities.iter().map(|a| a.created_at))
            .min()
    }
}

/// What the user asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Filters {
    pub period: TimePeriod,
    pub now: DateTime<Utc>,
    pub horizon_days: u32,
    pub bucket: BucketSize,
}

/// A snapshot plus the filters applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardContext {
    pub snapshot: Snapshot,
    pub filters: Filters,
}

impl DashboardContext {
    #[must_use]
    pub const fn new(snapshot: Snapshot, filters: Filters) -> Self {
        Self { snapshot, filters }
    }

    #[must_use]
    pub const fn records(&self) -> &Records {
        &self.snapshot.records
    }

    /// The concrete reporting range for the selected period.
    #[must_use]
    pub fn range(&self) -> Period {
        self.filters.period.resolve(self.filters.now, self.snapshot.earliest_record())
    }
}

/// Parameters of a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub organization: String,
    pub period: TimePeriod,
    pub page_size: u32,
    pub normalize: NormalizeOptions,
}

/// Fetch and normalize a fresh snapshot.
///
/// Members are always fetched in full. Activities are limited to the selected
/// period, except for `AllTime` which fetches all of them.
pub async fn fetch_snapshot(client: &Client, options: &FetchOptions, now: DateTime<Utc>) -> Result<Snapshot, FetchError> {
    let window = options.period.lookback_days().map(|_| options.period.resolve(now, None));

    log::info!(target: LOG_TARGET, "Fetching {} data from {}", options.organization, client.endpoint());
    let members = client.fetch_members(options.page_size).await?;
    let activities = client.fetch_activities(options.page_size, window).await?;
    let records = normalize_snapshot(&members, &activities, &options.normalize)?;

    Ok(Snapshot {
        organization: options.organization.clone(),
        fetched_at: now,
        period: options.period,
        records,
    })
}

/// Return a cached snapshot for these options when one is fresh, otherwise fetch and cache a new one.
pub async fn load_snapshot(client: &Client, cache: &Cache, options: &FetchOptions, now: DateTime<Utc>) -> Result<Snapshot> {
    let key = snapshot_key(options);

    match cache.load::<Snapshot>(&key) {
        CacheLookup::Hit { data, .. } => return Ok(data),
        CacheLookup::Miss(reason) => log::debug!(target: LOG_TARGET, "Snapshot {key} not cached ({reason})"),
    }

    let snapshot = fetch_snapshot(client, options, now)
        .await
        .into_app_err_with(|| format!("fetching data for organization '{}'", options.organization))?;

    if let Err(e) = cache.save(&key, &snapshot) {
        log::warn!(target: LOG_TARGET, "Could not cache snapshot: {e}");
    }

    Ok(snapshot)
}

#[must_use]
pub fn snapshot_key(options: &FetchOptions) -> String {
    cache_key(&[&options.organization, &options.period.to_string(), &options.normalize.education_coupon])
}
