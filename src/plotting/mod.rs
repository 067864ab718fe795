pub mod heatmap;
pub mod normalize;
pub mod raster;
pub mod styles;
pub mod svg;

pub use heatmap::{
    Cell, HeatmapRenderer, HeatmapStats, LegendItem, RenderConfig, Scene, StreakTracker, TextItem,
};
pub use normalize::{
    fixed_bucket, normalize, percentiles, IntensityMap, PercentileMap, ScaleMode, MAX_BUCKET,
};
pub use raster::save_png;
pub use styles::{Color, HeatmapTheme, Palette, PaletteTable};

#[cfg(test)]
mod tests;
