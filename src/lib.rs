//! # Contribution Pulse
//!
//! `contribution_pulse` turns a stream of timestamped activity events into a
//! calendar-year heatmap with derived statistics: daily totals, a typed
//! breakdown, percentile ranks, and current and longest streaks.
//!
//! ## Pipeline
//!
//! - [`analysis::CacheManager`] keeps aggregated datasets per identity and
//!   treats entries older than the TTL as absent
//! - [`analysis::aggregate_events`] folds raw events into per-day records
//! - [`plotting::normalize`] and [`plotting::percentiles`] scale daily totals
//! - [`plotting::HeatmapRenderer`] lays out the 53-week grid as a [`plotting::Scene`]
//! - [`plotting::svg::encode`] and [`plotting::save_png`] write the scene out
//!
//! ## Example
//!
//! ```no_run
//! use contribution_pulse::analysis::{CacheManager, JsonFileSource};
//! use contribution_pulse::plotting::{svg, HeatmapRenderer, RenderConfig};
//! use contribution_pulse::App;
//!
//! # async fn run() -> contribution_pulse::error::Result<()> {
//! let app = App::new(
//!     JsonFileSource::File("events.json".into()),
//!     CacheManager::default(),
//!     HeatmapRenderer::default(),
//! );
//! let scene = app.render("octocat", &RenderConfig::for_year(2024)).await?;
//! std::fs::write("octocat.svg", svg::encode(&scene)).ok();
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod app;
pub mod error;
pub mod plotting;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use app::App;
pub use error::PulseError;
pub use types::{ActivityDataset, ActivityEvent, Breakdown, CacheKey, DailyActivityRecord, EventKind};
