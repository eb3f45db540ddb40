//! SVG serialisation of canvas primitives
//!
//! Used for single-device output, for the scene export, and as the input to
//! PNG rasterisation. Numbers are written with at most three decimals so the
//! output is stable across runs.

use std::fmt::Write as _;

use super::canvas::{Canvas, Primitive, Stroke, TextAnchor};
use super::types::{Color, Rect};

/// Font stack used for every text primitive
pub const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Format a coordinate: three decimals, trailing zeros trimmed
pub fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Escape text for use in XML content and attribute values
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn paint_attr(out: &mut String, name: &str, color: Option<Color>) {
    match color {
        Some(c) => {
            let _ = write!(out, " {}=\"{}\"", name, c.to_hex());
            if c.a != 0xff {
                let _ = write!(out, " {}-opacity=\"{}\"", name, fmt_num(c.opacity()));
            }
        }
        None => {
            let _ = write!(out, " {}=\"none\"", name);
        }
    }
}

fn stroke_attrs(out: &mut String, stroke: Option<Stroke>) {
    paint_attr(out, "stroke", stroke.map(|s| s.color));
    if let Some(s) = stroke {
        let _ = write!(out, " stroke-width=\"{}\"", fmt_num(s.width));
    }
}

/// Append SVG elements for `primitives` to `out`, one per line
pub fn write_primitives(out: &mut String, primitives: &[Primitive], indent: &str) {
    for primitive in primitives {
        out.push_str(indent);
        match primitive {
            Primitive::Rect {
                rect,
                fill,
                stroke,
                corner_radius,
            } => {
                let _ = write!(
                    out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
                    fmt_num(rect.x),
                    fmt_num(rect.y),
                    fmt_num(rect.width.max(0.0)),
                    fmt_num(rect.height.max(0.0))
                );
                if *corner_radius > 0.0 {
                    let _ = write!(out, " rx=\"{}\"", fmt_num(*corner_radius));
                }
                paint_attr(out, "fill", *fill);
                stroke_attrs(out, *stroke);
                out.push_str("/>");
            }
            Primitive::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
            } => {
                let _ = write!(
                    out,
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"",
                    fmt_num(*x1),
                    fmt_num(*y1),
                    fmt_num(*x2),
                    fmt_num(*y2)
                );
                stroke_attrs(out, Some(*stroke));
                out.push_str("/>");
            }
            Primitive::Circle {
                cx,
                cy,
                r,
                fill,
                stroke,
            } => {
                let _ = write!(
                    out,
                    "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"",
                    fmt_num(*cx),
                    fmt_num(*cy),
                    fmt_num(r.max(0.0))
                );
                paint_attr(out, "fill", *fill);
                stroke_attrs(out, *stroke);
                out.push_str("/>");
            }
            Primitive::Text {
                x,
                y,
                text,
                size,
                color,
                anchor,
                bold,
            } => {
                let anchor = match anchor {
                    TextAnchor::Start => "start",
                    TextAnchor::Middle => "middle",
                    TextAnchor::End => "end",
                };
                let _ = write!(
                    out,
                    "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" text-anchor=\"{}\"",
                    fmt_num(*x),
                    fmt_num(*y),
                    FONT_FAMILY,
                    fmt_num(*size),
                    anchor
                );
                if *bold {
                    out.push_str(" font-weight=\"bold\"");
                }
                paint_attr(out, "fill", Some(*color));
                let _ = write!(out, ">{}</text>", escape_xml(text));
            }
            Primitive::Image { rect, asset } => {
                let _ = write!(
                    out,
                    "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
                    fmt_num(rect.x),
                    fmt_num(rect.y),
                    fmt_num(rect.width),
                    fmt_num(rect.height),
                    asset.data_uri()
                );
            }
        }
        out.push('\n');
    }
}

/// Open an `<svg>` document showing `view`, sized to match it
pub fn open_document(out: &mut String, view: Rect) {
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"{x} {y} {w} {h}\">",
        x = fmt_num(view.x),
        y = fmt_num(view.y),
        w = fmt_num(view.width.max(1.0)),
        h = fmt_num(view.height.max(1.0))
    );
}

/// Render a single canvas as a standalone SVG document
pub fn canvas_to_svg(canvas: &Canvas) -> String {
    let mut out = String::new();
    open_document(&mut out, canvas.frame());
    write_primitives(&mut out, canvas.primitives(), "  ");
    out.push_str("</svg>\n");
    out
}
