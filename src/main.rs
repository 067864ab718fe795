//! Contribution Pulse
//!
//! Command-line front end: reads exported activity events, renders the
//! heatmap for one user and writes SVG, PNG or JSON.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use contribution_pulse::analysis::JsonFileSource;
use contribution_pulse::app::{CacheBackendKind, Config};
use contribution_pulse::plotting::{save_png, svg, HeatmapRenderer, ScaleMode};
use contribution_pulse::App;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Vector heatmap
    Svg,
    /// Raster heatmap, requires --output
    Png,
    /// The year's dataset, one record per day
    Json,
    /// The composed scene as JSON
    Scene,
}

#[derive(Debug, Parser)]
#[command(name = "contribution-pulse", version, about)]
struct Args {
    /// User whose activity is rendered; also the cache key
    username: String,

    /// Events JSON file, or a directory holding <username>.json
    #[arg(short, long)]
    events: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Svg)]
    format: Format,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Calendar year to render, the current year by default
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(1970..=9999))]
    year: Option<i32>,

    /// Bucket scaling: fixed or percentile
    #[arg(long)]
    scale: Option<String>,

    /// Palette name: light, dark, neon, matrix or one from the config file
    #[arg(long)]
    theme: Option<String>,

    /// Cell size in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    size: Option<u32>,

    #[arg(long)]
    no_legend: bool,

    #[arg(long)]
    no_stats: bool,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for cached datasets
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Keep the cache in memory for this run only
    #[arg(long)]
    no_cache: bool,
}

fn main() -> Result<()> {
    let default_level = if cfg!(feature = "dev") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let args = Args::parse();
    let rt = Runtime::new().context("failed to start runtime")?;
    rt.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &args.cache_dir {
        config.cache.dir = Some(dir.clone());
    }
    if args.no_cache {
        config.cache.backend = CacheBackendKind::Memory;
    }

    let year = args.year.unwrap_or_else(|| Utc::now().year());
    let mut render_config = config.render_config(year);
    if let Some(scale) = &args.scale {
        render_config.scale = ScaleMode::parse_or_default(scale);
    }
    if let Some(theme) = &args.theme {
        render_config.palette = theme.clone();
    }
    if let Some(size) = args.size {
        render_config.cell_size = size;
    }
    render_config.show_legend &= !args.no_legend;
    render_config.show_stats &= !args.no_stats;

    let source = if args.events.is_dir() {
        JsonFileSource::Dir(args.events.clone())
    } else {
        JsonFileSource::File(args.events.clone())
    };
    let app = App::new(
        source,
        config.cache_manager(),
        HeatmapRenderer::new(config.palette_table()),
    );

    match args.format {
        Format::Json => {
            let dataset = app.dataset_for_year(&args.username, year).await;
            write_output(args.output.as_ref(), &serde_json::to_vec_pretty(&dataset)?)
        }
        Format::Scene => {
            let scene = app.render(&args.username, &render_config).await?;
            write_output(args.output.as_ref(), &serde_json::to_vec_pretty(&scene)?)
        }
        Format::Svg => {
            let scene = app.render(&args.username, &render_config).await?;
            write_output(args.output.as_ref(), svg::encode(&scene).as_bytes())
        }
        Format::Png => {
            let Some(path) = &args.output else {
                bail!("--format png needs --output");
            };
            let scene = app.render(&args.username, &render_config).await?;
            save_png(&scene, path)?;
            Ok(())
        }
    }
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
