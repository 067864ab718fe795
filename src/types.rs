//! # Common Types
//!
//! This module contains the common types used throughout the pipeline for
//! representing activity events, per-day datasets and cache identities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A key used for caching datasets per identity.
///
/// Keys are derived deterministically from the external identity (usually a
/// username) so that one identity always maps to one cache slot, and the
/// slot name is safe to use as a file stem.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the cache key for an identity.
    pub fn for_identity(identity: &str) -> Self {
        let key = identity
            .trim()
            .chars()
            .map(|c| match c.to_ascii_lowercase() {
                c @ ('a'..='z' | '0'..='9' | '_' | '-') => c,
                _ => '_',
            })
            .collect();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed sub-counts of a day's activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub commits: u64,
    pub pull_requests: u64,
    pub merges: u64,
    pub repositories_created: u64,
}

impl Breakdown {
    pub fn sum(&self) -> u64 {
        self.commits + self.pull_requests + self.merges + self.repositories_created
    }
}

impl std::ops::AddAssign for Breakdown {
    fn add_assign(&mut self, rhs: Self) {
        self.commits += rhs.commits;
        self.pull_requests += rhs.pull_requests;
        self.merges += rhs.merges;
        self.repositories_created += rhs.repositories_created;
    }
}

/// Activity recorded on one calendar day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivityRecord {
    /// Total number of activities, including kinds without a breakdown slot
    pub total: u64,
    pub breakdown: Breakdown,
}

/// Per-day activity keyed by UTC calendar date.
///
/// A dataset straight out of aggregation is *partial*: it only holds days
/// that received at least one contributing event and may span several
/// years. [`ActivityDataset::finalize`] scopes it to one year and zero-fills
/// every missing day, which is what the renderer expects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDataset {
    /// Target year, set once the dataset has been finalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub days: BTreeMap<NaiveDate, DailyActivityRecord>,
}

impl ActivityDataset {
    /// An empty, partial dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// A finalized dataset for `year` with every day at zero.
    pub fn zero_filled(year: i32) -> Self {
        let days = crate::utils::days_of_year(year)
            .map(|date| (date, DailyActivityRecord::default()))
            .collect();
        Self {
            year: Some(year),
            days,
        }
    }

    /// Scope the dataset to `year`, filling days without activity with zero.
    ///
    /// Days belonging to other years are dropped. The receiver is left
    /// untouched so a cached dataset can be finalized for any year.
    pub fn finalize(&self, year: i32) -> Self {
        let mut finalized = Self::zero_filled(year);
        if let Some(bounds) = year_bounds(year) {
            for (date, record) in self.days.range(bounds) {
                finalized.days.insert(*date, *record);
            }
        }
        finalized
    }

    pub fn is_finalized(&self) -> bool {
        self.year.is_some()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<&DailyActivityRecord> {
        self.days.get(date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Iterate over `(date, total)` pairs in date order.
    pub fn totals(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.days.iter().map(|(date, record)| (*date, record.total))
    }

    pub(crate) fn record_mut(&mut self, date: NaiveDate) -> &mut DailyActivityRecord {
        self.days.entry(date).or_default()
    }
}

fn year_bounds(year: i32) -> Option<std::ops::RangeInclusive<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some(first..=last)
}

/// The kind-specific part of an activity event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A push carrying `commits` commits
    Push { commits: u64 },
    /// A pull request event; both flags may be set on the same event
    PullRequest { opened: bool, merged: bool },
    /// Creation of a repository, branch or tag
    Create,
    /// Any kind the aggregator has no rule for
    Other(String),
}

/// One timestamped activity event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: EventKind,
    pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(kind: EventKind, created_at: DateTime<Utc>) -> Self {
        Self { kind, created_at }
    }

    /// The UTC calendar day the event belongs to.
    pub fn day(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}
