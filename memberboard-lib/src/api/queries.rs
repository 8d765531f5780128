//! The paginated queries this tool issues against the Memberful API.

use super::connection::{Connection, paginate};
use super::raw::{RawActivity, RawMember};
use super::{Client, FetchError};
use crate::metrics::Period;
use serde::Deserialize;
use serde_json::json;

const LOG_TARGET: &str = "   queries";

/// Largest page the API will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

const MEMBERS_QUERY: &str = "
query Members($first: Int!, $after: String) {
  members(first: $first, after: $after) {
    pageInfo { hasNextPage endCursor }
    nodes {
      id
      email
      fullName
      phoneNumber
      totalSpendCents
      metadata
      subscriptions {
        id
        active
        autorenew
        createdAt
        expiresAt
        plan { id name priceCents intervalUnit intervalCount type }
      }
      orders {
        uuid
        totalCents
        createdAt
        status
        couponDiscountAmountCents
        coupon { code }
      }
    }
  }
}
";

const ACTIVITIES_QUERY: &str = "
query Activities($first: Int!, $after: String) {
  activities(first: $first, after: $after) {
    pageInfo { hasNextPage endCursor }
    nodes {
      id
      type
      createdAt
      member { id email fullName }
      subscription {
        id
        orders { uuid totalCents coupon { code } }
        plan { id name priceCents intervalUnit intervalCount type }
      }
    }
  }
}
";

#[derive(Debug, Deserialize)]
struct MembersData {
    members: Connection<RawMember>,
}

#[derive(Debug, Deserialize)]
struct ActivitiesData {
    activities: Connection<RawActivity>,
}

fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

impl Client {
    /// Fetch every member, with nested subscriptions and orders.
    pub async fn fetch_members(&self, page_size: u32) -> Result<Vec<RawMember>, FetchError> {
        let first = clamp_page_size(page_size);

        paginate("members", |after| async move {
            let data: MembersData = self
                .execute("members", MEMBERS_QUERY, json!({ "first": first, "after": after }))
                .await?;
            data.members.into_page()
        })
        .await
    }

    /// Fetch every activity whose timestamp falls inside `window`.
    ///
    /// The API offers no server-side date filter, so all pages are read and the
    /// window is applied locally. Activities with unreadable timestamps are kept
    /// so that the normalizer can report them.
    pub async fn fetch_activities(&self, page_size: u32, window: Option<Period>) -> Result<Vec<RawActivity>, FetchError> {
        let first = clamp_page_size(page_size);

        let all = paginate("activities", |after| async move {
            let data: ActivitiesData = self
                .execute("activities", ACTIVITIES_QUERY, json!({ "first": first, "after": after }))
                .await?;
            data.activities.into_page()
        })
        .await?;

        let Some(window) = window else {
            return Ok(all);
        };

        let total = all.len();
        let kept: Vec<_> = all
            .into_iter()
            .filter(|activity| {
                activity
                    .created_at
                    .as_ref()
                    .and_then(super::RawScalar::as_timestamp)
                    .is_none_or(|at| window.contains(at))
            })
            .collect();

        log::debug!(target: LOG_TARGET, "Kept {} of {total} activities inside {window}", kept.len());
        Ok(kept)
    }
}
