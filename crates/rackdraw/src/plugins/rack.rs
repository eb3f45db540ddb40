//! Rack cabinet frame
//!
//! Two mounting posts with EIA-310 square holes (three per unit, at 0.25",
//! 0.875" and 1.5" from the unit boundary) and unit numbers counted from the
//! bottom, so U1 is the lowest unit.

use super::{palette, DeviceGeometry, DeviceRenderer, StyleOptions};
use crate::core::{Canvas, Color, RackError, Rect, Stroke, TextAnchor};

/// Hole centers within one unit, in inches from the unit top
const HOLE_OFFSETS_INCHES: [f64; 3] = [0.25, 0.875, 1.5];

/// Square cage-nut hole side
const HOLE_SIDE_INCHES: f64 = 0.375;

const INTERIOR: Color = Color::rgba(0x0b, 0x0f, 0x14, 0x33);

pub struct RackRenderer;

impl DeviceRenderer for RackRenderer {
    fn name(&self) -> &'static str {
        "rack"
    }

    fn draw(&self, canvas: &mut Canvas, frame: Rect, style: &StyleOptions) -> Result<(), RackError> {
        let geometry = DeviceGeometry::new(frame, style.rack_units)?;
        let post = geometry.ear_width();

        canvas.fill_rect(
            Rect::new(frame.x + post, frame.y, frame.width - 2.0 * post, frame.height),
            INTERIOR,
        );

        let hole = geometry
            .vertical_inches(HOLE_SIDE_INCHES)
            .min(post * 0.45);
        let number_size = geometry.units(0.24).min(post * 0.5);
        let lefts = [frame.x, frame.right() - post];

        for left in lefts {
            canvas.rect(
                Rect::new(left, frame.y, post, frame.height),
                Some(palette::STEEL),
                Some(Stroke::new(palette::OUTLINE, 0.5)),
                0.0,
            );
        }

        for u in 0..geometry.rack_units {
            let top = frame.y + f64::from(u) * geometry.unit;
            let number = geometry.rack_units - u;

            for left in lefts {
                // holes on the outer half, number on the inner half
                let outer = left == frame.x;
                let hole_cx = if outer {
                    left + post * 0.3
                } else {
                    left + post * 0.7
                };
                for offset in HOLE_OFFSETS_INCHES {
                    let cy = top + geometry.vertical_inches(offset);
                    canvas.fill_rect(
                        Rect::new(hole_cx - hole / 2.0, cy - hole / 2.0, hole, hole),
                        palette::HOLE,
                    );
                }
                let text_x = if outer {
                    left + post * 0.78
                } else {
                    left + post * 0.22
                };
                canvas.text(
                    text_x,
                    top + geometry.unit / 2.0 + number_size * 0.35,
                    &number.to_string(),
                    number_size,
                    palette::OUTLINE,
                    TextAnchor::Middle,
                );
            }

            if u > 0 {
                canvas.line(
                    frame.x + post,
                    top,
                    frame.right() - post,
                    top,
                    Stroke::new(palette::STEEL.darken(0.2), 0.25),
                );
            }
        }

        if let Some(label) = &style.label {
            canvas.text(
                frame.center_x(),
                frame.y + geometry.units(0.6),
                label,
                geometry.units(0.3),
                palette::STEEL,
                TextAnchor::Middle,
            );
        }

        geometry.draw_outline(canvas);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Primitive;

    #[test]
    fn test_units_numbered_from_bottom() {
        let mut canvas = Canvas::new(480.0, 42.0 * 44.0);
        let frame = canvas.frame();
        RackRenderer
            .draw(&mut canvas, frame, &StyleOptions::new(42))
            .unwrap();

        let numbers: Vec<(String, f64)> = canvas
            .primitives()
            .iter()
            .filter_map(|p| match p {
                Primitive::Text { text, y, .. } => Some((text.clone(), *y)),
                _ => None,
            })
            .collect();
        // one number per post per unit
        assert_eq!(numbers.len(), 84);

        let y_of = |label: &str| {
            numbers
                .iter()
                .find(|(text, _)| text == label)
                .map(|(_, y)| *y)
                .unwrap()
        };
        assert!(y_of("1") > y_of("42"));
        assert!(y_of("1") > 41.0 * 44.0);
    }

    #[test]
    fn test_three_holes_per_unit_per_post() {
        let mut canvas = Canvas::new(480.0, 88.0);
        let frame = canvas.frame();
        RackRenderer
            .draw(&mut canvas, frame, &StyleOptions::new(2))
            .unwrap();
        let holes = canvas
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { fill: Some(c), .. } if *c == palette::HOLE))
            .count();
        assert_eq!(holes, 3 * 2 * 2);
    }
}
