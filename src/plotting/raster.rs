use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::path::Path;

use super::heatmap::Scene;
use crate::error::{PulseError, Result};

type PlotError = Box<dyn Error + Send + Sync>;

/// Draw `scene` into a PNG at `path`.
///
/// Cell annotations have no raster equivalent and are dropped.
pub fn save_png(scene: &Scene, path: &Path) -> Result<()> {
    draw_png(scene, path).map_err(|e| PulseError::Render {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn draw_png(scene: &Scene, path: &Path) -> std::result::Result<(), PlotError> {
    let top = scene.header_height;
    let size = (
        scene.width.ceil().max(1.0) as u32,
        scene.total_height().ceil().max(1.0) as u32,
    );
    let to_px = |x: f64, y: f64| (x.round() as i32, (y + top).round() as i32);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    for cell in &scene.cells {
        root.draw(&Rectangle::new(
            [
                to_px(cell.x, cell.y),
                to_px(cell.x + cell.size, cell.y + cell.size),
            ],
            RGBColor::from(cell.fill).filled(),
        ))?;
    }

    for item in &scene.legend {
        root.draw(&Rectangle::new(
            [
                to_px(item.x, item.y),
                to_px(item.x + item.size, item.y + item.size),
            ],
            RGBColor::from(item.fill).filled(),
        ))?;
    }

    // Scene text is positioned by baseline; bottom-anchoring is the closest fit
    for text in scene.texts().filter(|t| !t.text.is_empty()) {
        let style = ("sans-serif", text.font_size)
            .into_font()
            .color(&RGBColor::from(text.color))
            .pos(Pos::new(HPos::Left, VPos::Bottom));
        root.draw(&Text::new(text.text.clone(), to_px(text.x, text.y), style))?;
    }

    root.present()?;
    log::info!("wrote {}x{} heatmap to {}", size.0, size.1, path.display());
    Ok(())
}
