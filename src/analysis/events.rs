use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::types::{ActivityDataset, ActivityEvent, Breakdown, EventKind};

/// What a single event adds to its day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contribution {
    pub total: u64,
    pub breakdown: Breakdown,
}

impl Contribution {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Contribution rule for each event kind. Unknown kinds add nothing.
pub fn contribution(kind: &EventKind) -> Contribution {
    let mut c = Contribution::default();
    match kind {
        EventKind::Push { commits } => {
            c.total += commits;
            c.breakdown.commits += commits;
        }
        EventKind::PullRequest { opened, merged } => {
            // Both fire for a PR that is opened and merged in the same event
            if *opened {
                c.total += 1;
                c.breakdown.pull_requests += 1;
            }
            if *merged {
                c.total += 1;
                c.breakdown.merges += 1;
            }
        }
        EventKind::Create => {
            c.total += 1;
            c.breakdown.repositories_created += 1;
        }
        EventKind::Other(_) => {}
    }
    c
}

/// Fold events into a partial dataset holding only days that received at
/// least one contributing event. Input order does not matter.
pub fn aggregate_events(events: &[ActivityEvent]) -> ActivityDataset {
    let mut dataset = ActivityDataset::new();
    let mut ignored = 0usize;

    for event in events {
        let c = contribution(&event.kind);
        if c.is_empty() {
            ignored += 1;
            continue;
        }
        let record = dataset.record_mut(event.day());
        record.total += c.total;
        record.breakdown += c.breakdown;
    }

    log::debug!(
        "aggregated {} events into {} days ({} without contribution)",
        events.len(),
        dataset.len(),
        ignored
    );
    dataset
}

/// Wire shape of a public activity event.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    payload: Value,
}

impl RawEvent {
    fn into_event(self) -> ActivityEvent {
        let kind = match self.kind.as_str() {
            "PushEvent" => EventKind::Push {
                commits: self
                    .payload
                    .get("commits")
                    .and_then(Value::as_array)
                    .map_or(0, |commits| commits.len() as u64),
            },
            "PullRequestEvent" => EventKind::PullRequest {
                opened: self.payload.get("action").and_then(Value::as_str) == Some("opened"),
                merged: self
                    .payload
                    .pointer("/pull_request/merged")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            "CreateEvent" => EventKind::Create,
            _ => EventKind::Other(self.kind.clone()),
        };
        ActivityEvent::new(kind, self.created_at)
    }
}

/// Decode a JSON array of raw events.
///
/// Records that don't match the event shape are skipped; only a document
/// that isn't a JSON array at all is an error.
pub fn decode_events(json: &str) -> Result<Vec<ActivityEvent>, FetchError> {
    let records: Vec<Value> = serde_json::from_str(json)?;
    let total = records.len();

    let events: Vec<ActivityEvent> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<RawEvent>(record) {
            Ok(raw) => Some(raw.into_event()),
            Err(e) => {
                log::debug!("skipping malformed event: {}", e);
                None
            }
        })
        .collect();

    if events.len() < total {
        log::warn!("skipped {} of {} malformed events", total - events.len(), total);
    }
    Ok(events)
}
