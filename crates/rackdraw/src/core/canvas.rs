//! Vector drawing surface shared by every device renderer
//!
//! A [`Canvas`] records drawing primitives in paint order. It never rasterises
//! anything itself; the SVG writer, the PNG exporter (through SVG) and the
//! PDF exporter all consume the same primitive list, so two canvases that
//! compare equal produce identical output everywhere.

use std::sync::Arc;

use super::types::{Color, Rect};
use crate::loader::ImageAsset;

/// Stroke settings for outlines and lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

/// Horizontal text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// A single drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        corner_radius: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Stroke,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Text {
        x: f64,
        /// Baseline position
        y: f64,
        text: String,
        size: f64,
        color: Color,
        anchor: TextAnchor,
        bold: bool,
    },
    Image {
        rect: Rect,
        asset: Arc<ImageAsset>,
    },
}

impl Primitive {
    /// Approximate bounds, text measured with a fixed glyph aspect
    pub fn bounds(&self) -> Rect {
        match self {
            Primitive::Rect { rect, .. } | Primitive::Image { rect, .. } => *rect,
            Primitive::Line { x1, y1, x2, y2, .. } => Rect::new(
                x1.min(*x2),
                y1.min(*y2),
                (x2 - x1).abs(),
                (y2 - y1).abs(),
            ),
            Primitive::Circle { cx, cy, r, .. } => Rect::new(cx - r, cy - r, 2.0 * r, 2.0 * r),
            Primitive::Text {
                x,
                y,
                text,
                size,
                anchor,
                ..
            } => {
                let width = super::text::text_width(text, *size);
                let left = match anchor {
                    TextAnchor::Start => *x,
                    TextAnchor::Middle => x - width / 2.0,
                    TextAnchor::End => x - width,
                };
                Rect::new(left, y - size, width, *size)
            }
        }
    }
}

/// Vector canvas representing one drawing surface
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    primitives: Vec<Primitive>,
}

impl Canvas {
    /// Create an empty canvas with the given dimensions
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    /// Drop all content and take on new dimensions
    pub fn reset(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.primitives.clear();
    }

    /// The full surface as a rectangle at the origin
    pub fn frame(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Append a raw primitive
    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    /// Filled rectangle with no outline
    pub fn fill_rect(&mut self, rect: Rect, fill: Color) {
        self.push(Primitive::Rect {
            rect,
            fill: Some(fill),
            stroke: None,
            corner_radius: 0.0,
        });
    }

    /// Outlined rectangle with no fill
    pub fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.push(Primitive::Rect {
            rect,
            fill: None,
            stroke: Some(stroke),
            corner_radius: 0.0,
        });
    }

    /// Rectangle with optional fill, outline and rounded corners
    pub fn rect(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>, radius: f64) {
        self.push(Primitive::Rect {
            rect,
            fill,
            stroke,
            corner_radius: radius.max(0.0),
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Stroke) {
        self.push(Primitive::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Option<Color>, stroke: Option<Stroke>) {
        self.push(Primitive::Circle {
            cx,
            cy,
            r,
            fill,
            stroke,
        });
    }

    /// Draw text with its baseline at `y`
    pub fn text(&mut self, x: f64, y: f64, text: &str, size: f64, color: Color, anchor: TextAnchor) {
        if text.is_empty() {
            return;
        }
        self.push(Primitive::Text {
            x,
            y,
            text: text.to_string(),
            size,
            color,
            anchor,
            bold: false,
        });
    }

    /// Draw bold text centered in `rect`, both axes
    pub fn text_centered(&mut self, rect: Rect, text: &str, size: f64, color: Color) {
        if text.is_empty() {
            return;
        }
        self.push(Primitive::Text {
            x: rect.center_x(),
            // Baseline sits about a third of the glyph height below center
            y: rect.center_y() + size * 0.35,
            text: text.to_string(),
            size,
            color,
            anchor: TextAnchor::Middle,
            bold: true,
        });
    }

    /// Draw a decoded image stretched over `rect`
    pub fn image(&mut self, rect: Rect, asset: Arc<ImageAsset>) {
        self.push(Primitive::Image { rect, asset });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas() {
        let canvas = Canvas::new(480.0, 44.0);
        assert_eq!(canvas.width, 480.0);
        assert_eq!(canvas.height, 44.0);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_primitives_keep_paint_order() {
        let mut canvas = Canvas::new(100.0, 100.0);
        canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
        canvas.circle(50.0, 50.0, 5.0, Some(Color::WHITE), None);
        assert_eq!(canvas.len(), 2);
        assert!(matches!(canvas.primitives()[0], Primitive::Rect { .. }));
        assert!(matches!(canvas.primitives()[1], Primitive::Circle { .. }));
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut canvas = Canvas::new(100.0, 100.0);
        canvas.text(0.0, 0.0, "", 12.0, Color::BLACK, TextAnchor::Start);
        canvas.text_centered(canvas.frame(), "", 12.0, Color::BLACK);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_reset_clears_content() {
        let mut canvas = Canvas::new(10.0, 10.0);
        canvas.line(0.0, 0.0, 10.0, 10.0, Stroke::new(Color::BLACK, 1.0));
        canvas.reset(480.0, 88.0);
        assert!(canvas.is_empty());
        assert_eq!(canvas.frame(), Rect::new(0.0, 0.0, 480.0, 88.0));
    }

    #[test]
    fn test_primitive_bounds() {
        let mut canvas = Canvas::new(100.0, 100.0);
        canvas.fill_rect(Rect::new(10.0, 10.0, 20.0, 20.0), Color::BLACK);
        canvas.circle(80.0, 80.0, 10.0, None, Some(Stroke::new(Color::BLACK, 1.0)));
        let bounds: Vec<Rect> = canvas.primitives().iter().map(Primitive::bounds).collect();
        assert_eq!(bounds[0], Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(bounds[1], Rect::new(70.0, 70.0, 20.0, 20.0));
    }

    #[test]
    fn test_negative_radius_is_clamped() {
        let mut canvas = Canvas::new(10.0, 10.0);
        canvas.rect(canvas.frame(), None, None, -3.0);
        match &canvas.primitives()[0] {
            Primitive::Rect { corner_radius, .. } => assert_eq!(*corner_radius, 0.0),
            other => panic!("unexpected primitive {:?}", other),
        }
    }
}
