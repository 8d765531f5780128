//! Memberful GraphQL API access
//!
//! This module owns everything that talks to the network: the HTTP client with
//! bearer authentication, the bounded retry policy, the cursor pagination loop,
//! and the raw record shapes the API returns.
//!
//! # Implementation Model
//!
//! [`Client::execute`] performs a single GraphQL POST, classifying failures into
//! [`FetchError`] variants. Only transient failures are retried, following the
//! schedule produced by [`RetryPolicy`]. Authentication failures are reported
//! immediately.
//!
//! [`paginate`] drives a page-fetching closure until the API reports that no
//! pages remain. Pages are fetched strictly sequentially.
//!
//! The raw types keep every field optional. Turning them into validated rows is
//! the job of the `records` module.

mod client;
mod connection;
mod error;
mod queries;
mod raw;
mod retry_policy;

pub use client::{Client, endpoint_for};
pub use connection::{Connection, Edge, Page, PageInfo, paginate};
pub use error::FetchError;
pub use queries::MAX_PAGE_SIZE;
pub use raw::{
    RawActivity, RawActivityMember, RawActivitySubscription, RawCoupon, RawMember, RawOrder, RawPlan, RawScalar, RawSubscription,
};
pub use retry_policy::RetryPolicy;
