use std::future::Future;
use std::path::PathBuf;

use super::events::decode_events;
use crate::error::FetchError;
use crate::types::{ActivityEvent, CacheKey};

/// Supplier of raw activity events for an identity.
///
/// A failed fetch is returned as `Err`; the pipeline turns it into an empty
/// event list so an unavailable upstream never fails a render.
pub trait EventSource: Send + Sync {
    fn fetch(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Vec<ActivityEvent>, FetchError>> + Send;
}

/// Serves a fixed list of events regardless of identity.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    events: Vec<ActivityEvent>,
}

impl StaticSource {
    pub fn new(events: Vec<ActivityEvent>) -> Self {
        Self { events }
    }
}

impl EventSource for StaticSource {
    async fn fetch(&self, _identity: &str) -> Result<Vec<ActivityEvent>, FetchError> {
        Ok(self.events.clone())
    }
}

/// Reads raw events exported from the public events API as JSON.
#[derive(Clone, Debug)]
pub enum JsonFileSource {
    /// One file shared by every identity
    File(PathBuf),
    /// `<dir>/<identity>.json` per identity
    Dir(PathBuf),
}

impl JsonFileSource {
    fn path_for(&self, identity: &str) -> PathBuf {
        match self {
            JsonFileSource::File(path) => path.clone(),
            JsonFileSource::Dir(dir) => {
                dir.join(format!("{}.json", CacheKey::for_identity(identity)))
            }
        }
    }
}

impl EventSource for JsonFileSource {
    async fn fetch(&self, identity: &str) -> Result<Vec<ActivityEvent>, FetchError> {
        let path = self.path_for(identity);
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;
        let events = decode_events(&json)?;
        log::info!("read {} events for {} from {}", events.len(), identity, path.display());
        Ok(events)
    }
}
