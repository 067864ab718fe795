//! Optional TOML configuration.
//!
//! ```toml
//! [cache]
//! backend = "file"        # or "memory"
//! dir = "/var/cache/pulse"
//! ttl_ms = 3600000
//!
//! [render]
//! theme = "dark"
//! scale = "fixed"
//! cell_size = 12
//!
//! [palettes]
//! sunset = ["#fff5eb", "#fdbe85", "#fd8d3c", "#e6550d", "#a63603"]
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::{
    CacheManager, FileBackend, MemoryBackend, DEFAULT_MEMORY_CAPACITY, DEFAULT_TTL,
};
use crate::error::{PulseError, Result};
use crate::plotting::styles::PALETTE_SIZE;
use crate::plotting::{Color, Palette, PaletteTable, RenderConfig, ScaleMode};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Memory,
    #[default]
    File,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    /// Directory for the file backend; the user cache dir when unset
    pub dir: Option<PathBuf>,
    pub ttl_ms: u64,
    /// Entries kept by the memory backend
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::default(),
            dir: None,
            ttl_ms: DEFAULT_TTL.as_millis() as u64,
            capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

/// Render settings applied when the command line doesn't override them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    pub theme: String,
    pub scale: String,
    pub cell_size: u32,
    pub gap: u32,
    pub show_legend: bool,
    pub show_stats: bool,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        let defaults = RenderConfig::default();
        Self {
            theme: defaults.palette,
            scale: defaults.scale.to_string(),
            cell_size: defaults.cell_size,
            gap: defaults.gap,
            show_legend: defaults.show_legend,
            show_stats: defaults.show_stats,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub render: RenderDefaults,
    /// Extra named palettes, five hex colours each
    pub palettes: BTreeMap<String, Vec<String>>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PulseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|message| PulseError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn cache_manager(&self) -> CacheManager {
        let ttl = Duration::from_millis(self.cache.ttl_ms);
        match self.cache.backend {
            CacheBackendKind::Memory => {
                CacheManager::new(MemoryBackend::new(self.cache.capacity)).with_ttl(ttl)
            }
            CacheBackendKind::File => {
                let dir = self.cache.dir.clone().unwrap_or_else(FileBackend::default_dir);
                log::debug!("caching datasets under {}", dir.display());
                CacheManager::new(FileBackend::new(dir)).with_ttl(ttl)
            }
        }
    }

    /// Built-in palettes plus the configured ones. Malformed palettes are
    /// skipped with a warning.
    pub fn palette_table(&self) -> PaletteTable {
        self.palettes
            .iter()
            .fold(PaletteTable::default(), |table, (name, colors)| {
                match parse_palette(colors) {
                    Some(palette) => table.with_palette(name, palette),
                    None => {
                        log::warn!(
                            "ignoring palette {:?}: expected {} colours like \"#a1b2c3\"",
                            name,
                            PALETTE_SIZE
                        );
                        table
                    }
                }
            })
    }

    /// Render settings for `year`. Out-of-range geometry is clamped with a
    /// warning.
    pub fn render_config(&self, year: i32) -> RenderConfig {
        RenderConfig {
            cell_size: clamp_geometry("cell_size", self.render.cell_size, 1),
            gap: clamp_geometry("gap", self.render.gap, 0),
            palette: self.render.theme.clone(),
            year,
            scale: ScaleMode::parse_or_default(&self.render.scale),
            show_legend: self.render.show_legend,
            show_stats: self.render.show_stats,
        }
    }
}

fn clamp_geometry(name: &str, value: u32, min: u32) -> u32 {
    let clamped = value.clamp(min, RenderConfig::MAX_GEOMETRY);
    if clamped != value {
        log::warn!("render.{} = {} is out of range, using {}", name, value, clamped);
    }
    clamped
}

fn parse_palette(colors: &[String]) -> Option<Palette> {
    let parsed: Vec<Color> = colors
        .iter()
        .map(|c| Color::from_hex(c))
        .collect::<Option<_>>()?;
    parsed.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache.ttl_ms, 3_600_000);

        let render = config.render_config(2024);
        assert_eq!(render, RenderConfig::for_year(2024));
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r##"
            [cache]
            backend = "memory"
            ttl_ms = 1000
            capacity = 4

            [render]
            theme = "sunset"
            scale = "percentile"
            cell_size = 10
            show_stats = false

            [palettes]
            sunset = ["#fff5eb", "#fdbe85", "#fd8d3c", "#e6550d", "#a63603"]
            broken = ["#fff", "#000"]
            "##,
        )
        .unwrap();

        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
        assert_eq!(config.cache_manager().ttl(), Duration::from_secs(1));

        let render = config.render_config(2023);
        assert_eq!(render.scale, ScaleMode::Percentile);
        assert_eq!(render.cell_size, 10);
        assert_eq!(render.gap, 2);
        assert!(!render.show_stats);
        assert!(render.show_legend);

        let table = config.palette_table();
        assert!(table.contains("sunset"));
        assert!(table.contains("dark"));
        assert!(!table.contains("broken"));
        assert_eq!(table.resolve("sunset").1[4], Color::rgb(0xa6, 0x36, 0x03));
    }

    #[test]
    fn test_render_geometry_is_clamped() {
        let config = Config::parse("[render]\ncell_size = 0\ngap = 4294967295").unwrap();
        let render = config.render_config(2024);
        assert_eq!(render.cell_size, 1);
        assert_eq!(render.gap, RenderConfig::MAX_GEOMETRY);

        let scene = crate::plotting::HeatmapRenderer::default()
            .render(&crate::ActivityDataset::zero_filled(2024), &render, "octocat")
            .unwrap();
        assert_eq!(scene.width, 53.0 * 101.0);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::parse("[cache]\nbackend = \"redis\"").is_err());

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("pulse.toml");
        std::fs::write(&path, "render = 5").unwrap();
        assert!(matches!(Config::load(&path), Err(PulseError::Config { .. })));
        assert!(matches!(
            Config::load(&temp_dir.path().join("missing.toml")),
            Err(PulseError::Io { .. })
        ));
    }
}
