//! Calendar-grid layout of a year of activity.
//!
//! The grid is always 53 weeks wide and 7 days tall, starting on the Sunday
//! on or before January 1st. Cells outside the target year are skipped, so
//! some years leave the last column mostly empty.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::normalize::{normalize, percentiles, ScaleMode};
use super::styles::{Color, GridStyle, HeatmapTheme, PaletteTable};
use crate::error::{PulseError, Result};
use crate::types::{ActivityDataset, Breakdown};
use crate::utils::grid_origin;

/// Layout and styling options for one render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub cell_size: u32,
    pub gap: u32,
    /// Palette name, resolved against the renderer's palette table
    pub palette: String,
    pub year: i32,
    pub scale: ScaleMode,
    pub show_legend: bool,
    pub show_stats: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: 12,
            gap: 2,
            palette: "light".to_string(),
            year: Utc::now().year(),
            scale: ScaleMode::Fixed,
            show_legend: true,
            show_stats: true,
        }
    }
}

impl RenderConfig {
    pub fn for_year(year: i32) -> Self {
        Self {
            year,
            ..Self::default()
        }
    }

    /// Largest cell size or gap accepted from configuration.
    pub const MAX_GEOMETRY: u32 = 100;

    fn pitch(&self) -> f64 {
        f64::from(self.cell_size) + f64::from(self.gap)
    }
}

/// A positioned piece of text; `y` is the baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub color: Color,
    pub text: String,
}

/// One day of the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub date: NaiveDate,
    pub week: u32,
    pub weekday: u32,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub fill: Color,
    pub bucket: u8,
    pub count: u64,
    pub percentile: Option<u8>,
    pub breakdown: Breakdown,
    pub annotation: String,
}

/// A legend swatch and its label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub fill: Color,
    pub label: TextItem,
}

/// Figures derived while walking the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub totals: Breakdown,
    pub total_activity: u64,
    pub active_days: u32,
    /// Busiest day's total as used for bucketing
    pub max_count: u64,
}

/// The composed heatmap, layered back to front.
///
/// Coordinates put the grid's top-left corner at the origin. Header text and
/// month labels sit above it, in a band of `header_height` units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f64,
    /// Grid plus legend and footer, excluding the header band
    pub height: f64,
    pub header_height: f64,
    pub year: i32,
    pub palette: String,
    pub description: String,
    pub header: TextItem,
    pub month_labels: Vec<TextItem>,
    pub cells: Vec<Cell>,
    pub legend: Vec<LegendItem>,
    pub footer: Option<TextItem>,
    pub stats: HeatmapStats,
}

impl Scene {
    pub fn total_height(&self) -> f64 {
        self.height + self.header_height
    }

    /// Every text item in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &TextItem> {
        std::iter::once(&self.header)
            .chain(&self.month_labels)
            .chain(self.legend.iter().map(|item| &item.label))
            .chain(&self.footer)
    }
}

/// Consecutive non-zero days in visit order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreakTracker {
    running: u32,
    pub longest: u32,
    pub current: u32,
}

impl StreakTracker {
    pub fn visit(&mut self, date: NaiveDate, count: u64, today: NaiveDate) {
        if count > 0 {
            self.running += 1;
        } else {
            self.running = 0;
        }
        self.longest = self.longest.max(self.running);
        if date == today {
            self.current = self.running;
        }
    }
}

/// Lays out datasets as calendar heatmaps.
#[derive(Clone, Debug, Default)]
pub struct HeatmapRenderer {
    palettes: PaletteTable,
    theme: HeatmapTheme,
}

impl HeatmapRenderer {
    pub fn new(palettes: PaletteTable) -> Self {
        Self {
            palettes,
            theme: HeatmapTheme::default(),
        }
    }

    pub fn with_theme(mut self, theme: HeatmapTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn palettes(&self) -> &PaletteTable {
        &self.palettes
    }

    /// Render with today's UTC date as the reference for the current streak.
    pub fn render(
        &self,
        dataset: &ActivityDataset,
        config: &RenderConfig,
        label: &str,
    ) -> Result<Scene> {
        self.render_at(dataset, config, label, Utc::now().date_naive())
    }

    /// Render `dataset`, which must be finalized for `config.year`.
    pub fn render_at(
        &self,
        dataset: &ActivityDataset,
        config: &RenderConfig,
        label: &str,
        today: NaiveDate,
    ) -> Result<Scene> {
        let (palette_name, colors) = self.palettes.resolve(&config.palette);
        if palette_name != config.palette {
            log::warn!("unknown palette {:?}, using {}", config.palette, palette_name);
        }

        let intensities = normalize(dataset, config.scale);
        let ranks = percentiles(dataset);

        let cell_size = f64::from(config.cell_size);
        let pitch = config.pitch();
        let year = config.year;

        let mut cells = Vec::new();
        let mut month_labels = Vec::new();
        let mut last_month: Option<u32> = None;
        let mut streaks = StreakTracker::default();
        let mut stats = HeatmapStats {
            max_count: intensities.max,
            ..Default::default()
        };

        if let Some(origin) = grid_origin(year) {
            for week in 0..GridStyle::WEEKS {
                for weekday in 0..GridStyle::DAYS {
                    let date = origin + Duration::days(i64::from(week * 7 + weekday));
                    if date.year() != year {
                        continue;
                    }

                    let record = dataset.get(&date).ok_or(PulseError::MissingDay(date))?;
                    let count = record.total;
                    let bucket = intensities.bucket(&date);
                    let percentile = ranks.get(&date);

                    streaks.visit(date, count, today);

                    let x = f64::from(week) * pitch;
                    let y = f64::from(weekday) * pitch;

                    stats.totals += record.breakdown;
                    stats.total_activity += count;
                    if count > 0 {
                        stats.active_days += 1;
                    }

                    cells.push(Cell {
                        date,
                        week,
                        weekday,
                        x,
                        y,
                        size: cell_size,
                        fill: colors[usize::from(bucket).min(colors.len() - 1)],
                        bucket,
                        count,
                        percentile,
                        breakdown: record.breakdown,
                        annotation: annotate(date, count, percentile, &record.breakdown),
                    });

                    if weekday == 0 && last_month != Some(date.month()) {
                        month_labels.push(TextItem {
                            x,
                            y: -cell_size * 0.3,
                            font_size: cell_size,
                            color: self.theme.label_color,
                            text: date.format("%b").to_string(),
                        });
                        last_month = Some(date.month());
                    }
                }
            }
        }

        stats.current_streak = streaks.current;
        stats.longest_streak = streaks.longest;

        let grid_height = f64::from(GridStyle::DAYS) * pitch;
        let legend_height = if config.show_legend {
            GridStyle::LEGEND_HEIGHT.max(cell_size + 28.0)
        } else {
            0.0
        };
        let footer_height = if config.show_stats {
            GridStyle::FOOTER_HEIGHT.max(cell_size + 8.0)
        } else {
            0.0
        };

        let legend = if config.show_legend {
            let y = grid_height + 10.0;
            let last = colors.len() - 1;
            colors
                .iter()
                .enumerate()
                .map(|(i, fill)| {
                    let x = i as f64 * (cell_size + 2.0 * f64::from(config.gap));
                    let text = match i {
                        0 => "0".to_string(),
                        i if i == last => format!("{}+", intensities.max),
                        i => i.to_string(),
                    };
                    LegendItem {
                        x,
                        y,
                        size: cell_size,
                        fill: *fill,
                        label: TextItem {
                            x,
                            y: y + cell_size + 10.0,
                            font_size: cell_size * 0.8,
                            color: self.theme.label_color,
                            text,
                        },
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        let footer = config.show_stats.then(|| TextItem {
            x: 0.0,
            y: grid_height + legend_height + footer_height - 6.0,
            font_size: cell_size,
            color: self.theme.text_color,
            text: format!(
                "Current Streak: {}, Longest Streak: {} | Total: {} commits, {} PRs, {} Merges, {} Repos",
                stats.current_streak,
                stats.longest_streak,
                stats.totals.commits,
                stats.totals.pull_requests,
                stats.totals.merges,
                stats.totals.repositories_created,
            ),
        });

        let header = TextItem {
            x: 0.0,
            y: -(cell_size + 8.0),
            font_size: cell_size * 1.2,
            color: self.theme.text_color,
            text: format!("{} - {} commits in {}", label, stats.totals.commits, year),
        };

        log::debug!(
            "rendered {} cells for {} ({}), longest streak {}",
            cells.len(),
            label,
            year,
            stats.longest_streak
        );

        Ok(Scene {
            width: f64::from(GridStyle::WEEKS) * pitch,
            height: grid_height + legend_height + footer_height,
            header_height: (cell_size * 2.2 + 12.0).ceil(),
            year,
            palette: palette_name.to_string(),
            description: format!("ContributionPulse heatmap for year {}", year),
            header,
            month_labels,
            cells,
            legend,
            footer,
            stats,
        })
    }
}

fn annotate(date: NaiveDate, count: u64, percentile: Option<u8>, b: &Breakdown) -> String {
    let rank = percentile
        .map(|p| format!(" (percentile {})", p))
        .unwrap_or_default();
    format!(
        "{} - {} activities{}\nCommits: {}\nPRs: {}\nMerges: {}\nRepos: {}",
        date.format("%Y-%m-%d"),
        count,
        rank,
        b.commits,
        b.pull_requests,
        b.merges,
        b.repositories_created
    )
}
