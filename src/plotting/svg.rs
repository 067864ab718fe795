use std::fmt::Write;

use super::heatmap::{Scene, TextItem};
use super::styles::GridStyle;

/// Encode a scene as a standalone SVG document.
///
/// The view box is shifted up by the header band so text placed above the
/// grid stays visible. Every cell carries its annotation as a `<title>`.
pub fn encode(scene: &Scene) -> String {
    let width = num(scene.width);
    let height = num(scene.total_height());
    let mut out = String::with_capacity(scene.cells.len() * 220 + 1024);

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 {top} {w} {h}">"#,
        w = width,
        h = height,
        top = num(-scene.header_height),
    );
    let _ = writeln!(out, "  <desc>{}</desc>", escape(&scene.description));

    write_text(&mut out, &scene.header);

    for label in &scene.month_labels {
        write_text(&mut out, label);
    }

    for cell in &scene.cells {
        let _ = writeln!(
            out,
            r#"  <rect x="{x}" y="{y}" width="{s}" height="{s}" fill="{fill}" rx="{r}" ry="{r}"><title>{title}</title></rect>"#,
            x = num(cell.x),
            y = num(cell.y),
            s = num(cell.size),
            fill = cell.fill.to_hex(),
            r = num(GridStyle::CORNER_RADIUS),
            title = escape(&cell.annotation),
        );
    }

    for item in &scene.legend {
        let _ = writeln!(
            out,
            r#"  <rect x="{x}" y="{y}" width="{s}" height="{s}" fill="{fill}"></rect>"#,
            x = num(item.x),
            y = num(item.y),
            s = num(item.size),
            fill = item.fill.to_hex(),
        );
        write_text(&mut out, &item.label);
    }

    if let Some(footer) = &scene.footer {
        write_text(&mut out, footer);
    }

    out.push_str("</svg>\n");
    out
}

fn write_text(out: &mut String, text: &TextItem) {
    let _ = writeln!(
        out,
        r#"  <text x="{}" y="{}" font-size="{}" fill="{}">{}</text>"#,
        num(text.x),
        num(text.y),
        num(text.font_size),
        text.color.to_hex(),
        escape(&text.text),
    );
}

/// Shortest form of a coordinate: integers without a fraction, others to two places.
fn num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
