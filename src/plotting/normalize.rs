//! Mapping of daily counts onto intensity buckets and percentile ranks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ActivityDataset;

/// Highest intensity bucket; buckets run `0..=MAX_BUCKET`.
pub const MAX_BUCKET: u8 = 4;

/// How daily counts are turned into intensity buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Linear in the ratio of a day's count to the busiest day
    #[default]
    Fixed,
    /// Percentile-based scaling. Every day currently lands in bucket 0;
    /// percentiles are still computed and annotated.
    Percentile,
}

impl ScaleMode {
    /// Parse a scale name, substituting [`ScaleMode::Fixed`] for anything
    /// unrecognised.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("unknown scale {:?}, using fixed", name);
            Self::default()
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleMode::Fixed => "fixed",
            ScaleMode::Percentile => "percentile",
        }
    }
}

impl std::str::FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(ScaleMode::Fixed),
            "percentile" => Ok(ScaleMode::Percentile),
            other => Err(format!("unknown scale mode {:?}", other)),
        }
    }
}

impl std::fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-day intensity buckets together with the count they were scaled against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntensityMap {
    buckets: BTreeMap<NaiveDate, u8>,
    /// Greatest daily total, floored at 1
    pub max: u64,
}

impl IntensityMap {
    /// Bucket for `date`, 0 for days outside the dataset.
    pub fn bucket(&self, date: &NaiveDate) -> u8 {
        self.buckets.get(date).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &u8)> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Per-day percentile rank in `1..=100`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PercentileMap {
    ranks: BTreeMap<NaiveDate, u8>,
}

impl PercentileMap {
    pub fn get(&self, date: &NaiveDate) -> Option<u8> {
        self.ranks.get(date).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &u8)> {
        self.ranks.iter()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// `floor(count / max * 4)` clamped to `0..=4`, computed in integers.
pub fn fixed_bucket(count: u64, max: u64) -> u8 {
    let max = u128::from(max.max(1));
    let bucket = u128::from(count) * u128::from(MAX_BUCKET) / max;
    bucket.min(u128::from(MAX_BUCKET)) as u8
}

/// Assign an intensity bucket to every day of `dataset`.
pub fn normalize(dataset: &ActivityDataset, mode: ScaleMode) -> IntensityMap {
    let max = dataset.totals().map(|(_, total)| total).max().unwrap_or(0).max(1);

    let buckets = dataset
        .totals()
        .map(|(date, total)| {
            let bucket = match mode {
                ScaleMode::Fixed => fixed_bucket(total, max),
                ScaleMode::Percentile => 0,
            };
            (date, bucket)
        })
        .collect();

    IntensityMap { buckets, max }
}

/// Rank every day against all days of `dataset`.
///
/// A day's rank is the number of days whose total is less than or equal to
/// its own, so ties share the higher rank and the busiest day always gets
/// 100.
pub fn percentiles(dataset: &ActivityDataset) -> PercentileMap {
    let mut sorted: Vec<u64> = dataset.totals().map(|(_, total)| total).collect();
    sorted.sort_unstable();
    let days = sorted.len() as u64;

    let ranks = dataset
        .totals()
        .map(|(date, total)| {
            let rank = sorted.partition_point(|v| *v <= total) as u64;
            let percentile = (rank * 100).div_ceil(days);
            (date, percentile.clamp(1, 100) as u8)
        })
        .collect();

    PercentileMap { ranks }
}
