use chrono::NaiveDate;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use crate::analysis::{aggregate_events, CacheManager, EventSource};
use crate::error::Result;
use crate::plotting::{HeatmapRenderer, RenderConfig, Scene};
use crate::types::{ActivityDataset, CacheKey};

/// Runs the pipeline for one identity: cache, fetch, aggregate, finalize, render.
pub struct App<S> {
    source: S,
    cache: Arc<CacheManager>,
    renderer: HeatmapRenderer,
}

impl<S: EventSource> App<S> {
    pub fn new(source: S, cache: CacheManager, renderer: HeatmapRenderer) -> Self {
        Self {
            source,
            cache: Arc::new(cache),
            renderer,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn renderer(&self) -> &HeatmapRenderer {
        &self.renderer
    }

    /// The identity's aggregated activity, from cache when fresh.
    ///
    /// An unavailable event source yields an empty dataset, which is cached
    /// like any other result.
    pub async fn load_dataset(&self, identity: &str) -> ActivityDataset {
        let key = CacheKey::for_identity(identity);

        if let Some(dataset) = self.cache_get(key.clone()).await {
            return dataset;
        }

        let events = match self.source.fetch(identity).await {
            Ok(events) => events,
            Err(e) => {
                log::warn!("event fetch failed for {}: {}", identity, e);
                Vec::new()
            }
        };

        let dataset = aggregate_events(&events);
        self.cache_put(key, dataset.clone()).await;
        dataset
    }

    /// The identity's activity for `year`, one record per day.
    pub async fn dataset_for_year(&self, identity: &str, year: i32) -> ActivityDataset {
        self.load_dataset(identity).await.finalize(year)
    }

    pub async fn render(&self, identity: &str, config: &RenderConfig) -> Result<Scene> {
        let dataset = self.dataset_for_year(identity, config.year).await;
        self.renderer.render(&dataset, config, identity)
    }

    /// Like [`App::render`] with an explicit date for the current streak.
    pub async fn render_at(
        &self,
        identity: &str,
        config: &RenderConfig,
        today: NaiveDate,
    ) -> Result<Scene> {
        let dataset = self.dataset_for_year(identity, config.year).await;
        self.renderer.render_at(&dataset, config, identity, today)
    }

    async fn cache_get(&self, key: CacheKey) -> Option<ActivityDataset> {
        let cache = Arc::clone(&self.cache);
        spawn_blocking(move || cache.get(&key))
            .await
            .unwrap_or_else(|e| {
                log::warn!("cache lookup task failed: {}", e);
                None
            })
    }

    async fn cache_put(&self, key: CacheKey, dataset: ActivityDataset) {
        let cache = Arc::clone(&self.cache);
        if let Err(e) = spawn_blocking(move || cache.put(&key, dataset)).await {
            log::warn!("cache write task failed: {}", e);
        }
    }
}
