#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for memberboard
//!
//! This library consolidates all functionality for the memberboard tool, which turns
//! the members, subscriptions, orders and activity of a Memberful organization into
//! membership and revenue metrics.
//!
//! # Module Organization
//!
//! - [`api`]: GraphQL client, pagination and retries
//! - [`records`]: Validation of raw API records into typed rows
//! - [`snapshot`]: Point-in-time dataset and the filters applied to it
//! - [`cache`]: On-disk snapshot cache
//! - [`metrics`]: Metric computation over a snapshot
//! - [`reports`]: Report generation in multiple formats
//! - [`commands`]: Command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod api;
#[cfg(not(any(debug_assertions, test)))]
mod api;

#[cfg(any(debug_assertions, test))]
pub mod cache;
#[cfg(not(any(debug_assertions, test)))]
mod cache;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod metrics;
#[cfg(not(any(debug_assertions, test)))]
mod metrics;

#[cfg(any(debug_assertions, test))]
pub mod records;
#[cfg(not(any(debug_assertions, test)))]
mod records;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

#[cfg(any(debug_assertions, test))]
pub mod snapshot;
#[cfg(not(any(debug_assertions, test)))]
mod snapshot;

pub use crate::commands::{Host, run};
