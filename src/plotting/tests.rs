use super::*;
use crate::analysis::aggregate_events;
use crate::error::PulseError;
use crate::types::{ActivityDataset, ActivityEvent, Breakdown, DailyActivityRecord, EventKind};
use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn with_counts(year: i32, counts: &[(NaiveDate, u64)]) -> ActivityDataset {
    let mut dataset = ActivityDataset::zero_filled(year);
    for (day, total) in counts {
        dataset.days.insert(
            *day,
            DailyActivityRecord {
                total: *total,
                breakdown: Breakdown {
                    commits: *total,
                    ..Default::default()
                },
            },
        );
    }
    dataset
}

fn render(dataset: &ActivityDataset, config: &RenderConfig) -> Scene {
    HeatmapRenderer::default()
        .render_at(dataset, config, "octocat", date(config.year, 6, 1))
        .unwrap()
}

#[test]
fn test_single_day_end_to_end() {
    let push = ActivityEvent::new(
        EventKind::Push { commits: 5 },
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap(),
    );
    let dataset = aggregate_events(&[push]).finalize(2024);
    let scene = render(&dataset, &RenderConfig::for_year(2024));

    let active: Vec<_> = scene.cells.iter().filter(|c| c.bucket > 0).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].bucket, MAX_BUCKET);
    assert_eq!(active[0].date, date(2024, 3, 15));
    assert_eq!(active[0].fill, styles::LIGHT[4]);

    assert_eq!(
        scene.stats.totals,
        Breakdown {
            commits: 5,
            ..Default::default()
        }
    );
    let footer = scene.footer.as_ref().unwrap();
    assert!(footer.text.ends_with("Total: 5 commits, 0 PRs, 0 Merges, 0 Repos"));
    assert_eq!(scene.header.text, "octocat - 5 commits in 2024");
}

#[test]
fn test_streaks_over_visit_order() {
    let start = date(2024, 1, 1);
    let mut tracker = StreakTracker::default();
    for (i, count) in [1, 1, 0, 1, 1, 1].into_iter().enumerate() {
        tracker.visit(start + chrono::Duration::days(i as i64), count, date(2030, 1, 1));
    }
    assert_eq!(tracker.longest, 3);
    assert_eq!(tracker.current, 0);
}

#[test]
fn test_current_streak_snapshots_today() {
    let dataset = with_counts(
        2024,
        &[
            (date(2024, 3, 1), 2),
            (date(2024, 3, 2), 1),
            (date(2024, 3, 3), 4),
            (date(2024, 3, 10), 1),
        ],
    );
    let renderer = HeatmapRenderer::default();
    let config = RenderConfig::for_year(2024);

    let scene = renderer
        .render_at(&dataset, &config, "octocat", date(2024, 3, 3))
        .unwrap();
    assert_eq!(scene.stats.current_streak, 3);
    assert_eq!(scene.stats.longest_streak, 3);
    assert_eq!(scene.stats.active_days, 4);

    let scene = renderer
        .render_at(&dataset, &config, "octocat", date(2024, 3, 4))
        .unwrap();
    assert_eq!(scene.stats.current_streak, 0);
}

#[test]
fn test_grid_covers_year() {
    for year in [2023, 2024, 2025] {
        let scene = render(&ActivityDataset::zero_filled(year), &RenderConfig::for_year(year));
        assert_eq!(scene.cells.len() as u32, crate::utils::days_in_year(year));
        assert!(scene.cells.iter().all(|c| c.week < 53 && c.weekday < 7));
        assert_eq!(scene.month_labels.len(), 12);
        assert_eq!(scene.month_labels[0].text, "Jan");
        assert_eq!(scene.month_labels[11].text, "Dec");
    }
}

#[test]
fn test_fixed_grid_drops_overflowing_day() {
    // 2028 is a leap year starting on a Saturday: 6 + 366 days don't fit in 53 weeks
    let scene = render(&ActivityDataset::zero_filled(2028), &RenderConfig::for_year(2028));
    assert_eq!(scene.cells.len(), 365);
    assert_eq!(scene.cells.last().map(|c| c.date), Some(date(2028, 12, 30)));
}

#[test]
fn test_cell_positions() {
    let config = RenderConfig::for_year(2023);
    let scene = render(&ActivityDataset::zero_filled(2023), &config);

    // 2023-01-01 is a Sunday, so the first cell sits at the origin
    let first = &scene.cells[0];
    assert_eq!(first.date, date(2023, 1, 1));
    assert_eq!((first.x, first.y), (0.0, 0.0));

    let wednesday = scene
        .cells
        .iter()
        .find(|c| c.date == date(2023, 1, 11))
        .unwrap();
    assert_eq!((wednesday.week, wednesday.weekday), (1, 3));
    assert_eq!((wednesday.x, wednesday.y), (14.0, 42.0));
}

#[test]
fn test_canvas_size() {
    let dataset = ActivityDataset::zero_filled(2024);
    let mut config = RenderConfig::for_year(2024);

    let scene = render(&dataset, &config);
    assert_eq!(scene.width, 53.0 * 14.0);
    assert_eq!(scene.height, 7.0 * 14.0 + 40.0 + 20.0);

    config.show_legend = false;
    config.show_stats = false;
    let scene = render(&dataset, &config);
    assert_eq!(scene.height, 7.0 * 14.0);
    assert!(scene.legend.is_empty());
    assert!(scene.footer.is_none());
}

#[test]
fn test_legend_labels() {
    let dataset = with_counts(2024, &[(date(2024, 5, 5), 17), (date(2024, 5, 6), 3)]);
    let scene = render(&dataset, &RenderConfig::for_year(2024));

    let labels: Vec<_> = scene.legend.iter().map(|l| l.label.text.as_str()).collect();
    assert_eq!(labels, vec!["0", "1", "2", "3", "17+"]);
    assert_eq!(scene.legend[4].fill, styles::LIGHT[4]);
    assert_eq!(scene.legend[1].x, 16.0);
}

#[test]
fn test_percentile_scale_renders_empty_buckets() {
    let dataset = with_counts(2024, &[(date(2024, 5, 5), 17), (date(2024, 5, 6), 3)]);
    let mut config = RenderConfig::for_year(2024);
    config.scale = ScaleMode::Percentile;

    let scene = render(&dataset, &config);
    assert!(scene.cells.iter().all(|c| c.bucket == 0));
    let busiest = scene
        .cells
        .iter()
        .find(|c| c.date == date(2024, 5, 5))
        .unwrap();
    assert_eq!(busiest.percentile, Some(100));
    assert!(busiest.annotation.contains("(percentile 100)"));
    assert_eq!(scene.legend[4].label.text, "17+");
}

#[test]
fn test_unknown_palette_falls_back() {
    let mut config = RenderConfig::for_year(2024);
    config.palette = "sepia".to_string();
    let scene = render(&ActivityDataset::zero_filled(2024), &config);
    assert_eq!(scene.palette, "light");

    config.palette = "matrix".to_string();
    let scene = render(&ActivityDataset::zero_filled(2024), &config);
    assert_eq!(scene.palette, "matrix");
    assert_eq!(scene.cells[0].fill, styles::MATRIX[0]);
}

#[test]
fn test_custom_palette_table() {
    let gray = [Color::rgb(0, 0, 0); styles::PALETTE_SIZE];
    let renderer = HeatmapRenderer::new(PaletteTable::new("gray", gray));
    let scene = renderer
        .render_at(
            &ActivityDataset::zero_filled(2024),
            &RenderConfig::for_year(2024),
            "octocat",
            date(2024, 1, 1),
        )
        .unwrap();
    assert_eq!(scene.palette, "gray");
}

#[test]
fn test_partial_dataset_is_rejected() {
    let dataset = with_counts(2024, &[]).finalize(2023);
    let result = HeatmapRenderer::default().render_at(
        &dataset,
        &RenderConfig::for_year(2024),
        "octocat",
        date(2024, 1, 1),
    );
    assert!(matches!(result, Err(PulseError::MissingDay(d)) if d == date(2024, 1, 1)));
}

#[test]
fn test_annotation() {
    let mut dataset = ActivityDataset::zero_filled(2024);
    dataset.days.insert(
        date(2024, 2, 29),
        DailyActivityRecord {
            total: 6,
            breakdown: Breakdown {
                commits: 2,
                pull_requests: 1,
                merges: 1,
                repositories_created: 1,
            },
        },
    );
    let scene = render(&dataset, &RenderConfig::for_year(2024));
    let cell = scene
        .cells
        .iter()
        .find(|c| c.date == date(2024, 2, 29))
        .unwrap();
    assert_eq!(
        cell.annotation,
        "2024-02-29 - 6 activities (percentile 100)\nCommits: 2\nPRs: 1\nMerges: 1\nRepos: 1"
    );
}

#[test]
fn test_svg_output() {
    let dataset = with_counts(2024, &[(date(2024, 5, 5), 2)]);
    let scene = HeatmapRenderer::default()
        .render_at(
            &dataset,
            &RenderConfig::for_year(2024),
            "<script>",
            date(2024, 5, 5),
        )
        .unwrap();
    let svg = svg::encode(&scene);

    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains("viewBox=\"0 -39 742 197\""));
    assert!(svg.contains("&lt;script&gt; - 2 commits in 2024"));
    assert!(!svg.contains("<script>"));
    assert_eq!(svg.matches("<title>").count(), 366);
    assert!(svg.contains("Current Streak: 1, Longest Streak: 1"));
}

#[test]
fn test_scene_serializes() {
    let scene = render(&ActivityDataset::zero_filled(2024), &RenderConfig::for_year(2024));
    let json = serde_json::to_value(&scene).unwrap();
    assert_eq!(json["cells"][0]["fill"], "#ebedf0");
    assert_eq!(json["cells"][0]["date"], "2024-01-01");
    let back: Scene = serde_json::from_value(json).unwrap();
    assert_eq!(back.cells.len(), scene.cells.len());
    assert_eq!(back.stats, scene.stats);
    assert_eq!(back.cells[10].annotation, scene.cells[10].annotation);
}

#[test]
fn test_png_output() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("heatmap.png");
    let dataset = with_counts(2024, &[(date(2024, 5, 5), 2)]);
    let mut config = RenderConfig::for_year(2024);
    config.show_legend = false;
    config.show_stats = false;

    let mut scene = render(&dataset, &config);
    // Keep the raster check independent of installed fonts
    scene.header.text.clear();
    scene.month_labels.clear();
    save_png(&scene, &path).unwrap();

    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);

    // Failures surface as a typed error the CLI can propagate
    let missing = temp_dir.path().join("missing").join("heatmap.png");
    let err = save_png(&scene, &missing).unwrap_err();
    assert!(matches!(err, PulseError::Render { ref path, .. } if *path == missing));
    let err: anyhow::Error = err.into();
    assert!(err.to_string().contains("heatmap.png"));
}

#[test]
fn test_oversized_geometry_renders() {
    let dataset = ActivityDataset::zero_filled(2024);
    let mut config = RenderConfig::for_year(2024);
    config.gap = u32::MAX;
    config.cell_size = u32::MAX;

    let scene = render(&dataset, &config);
    assert_eq!(scene.width, 53.0 * 2.0 * f64::from(u32::MAX));
    assert_eq!(scene.cells.len(), 366);
}
