//! Blank filler panel, optionally vented
//!
//! `vented` draws two staggered rows of slots per rack unit.

use super::{palette, DeviceGeometry, DeviceRenderer, StyleOptions};
use crate::core::{Canvas, RackError, Rect};

const SLOT_WIDTH_INCHES: f64 = 0.6;
const SLOT_PITCH_INCHES: f64 = 0.9;

pub struct BlankPanelRenderer;

impl DeviceRenderer for BlankPanelRenderer {
    fn name(&self) -> &'static str {
        "blank_panel"
    }

    fn draw(&self, canvas: &mut Canvas, frame: Rect, style: &StyleOptions) -> Result<(), RackError> {
        let geometry = DeviceGeometry::new(frame, style.rack_units)?;
        let body = geometry.body();
        geometry.draw_ears(canvas, palette::EAR);
        canvas.fill_rect(body, palette::CHASSIS_LIGHT);

        if style.flag("vented") {
            let slot_w = geometry.inches(SLOT_WIDTH_INCHES);
            let slot_h = geometry.units(0.12);
            let pitch = geometry.inches(SLOT_PITCH_INCHES);
            let margin = geometry.inches(0.4);
            let usable = body.width - 2.0 * margin;
            let per_row = ((usable - slot_w) / pitch).floor().max(0.0) as u32 + 1;

            for u in 0..geometry.rack_units {
                let top = body.y + f64::from(u) * geometry.unit;
                for (row, stagger) in [(0.3, 0.0), (0.58, pitch / 2.0)] {
                    let y = top + geometry.unit * row;
                    for i in 0..per_row {
                        let x = body.x + margin + stagger + f64::from(i) * pitch;
                        if x + slot_w > body.right() - margin {
                            break;
                        }
                        canvas.rect(
                            Rect::new(x, y, slot_w, slot_h),
                            Some(palette::HOLE),
                            None,
                            slot_h / 2.0,
                        );
                    }
                }
            }
        }

        geometry.draw_outline(canvas);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vented_adds_slots() {
        let mut plain = Canvas::new(480.0, 44.0);
        let mut vented = Canvas::new(480.0, 44.0);
        let frame = plain.frame();
        BlankPanelRenderer
            .draw(&mut plain, frame, &StyleOptions::new(1))
            .unwrap();
        BlankPanelRenderer
            .draw(&mut vented, frame, &StyleOptions::new(1).with_param("vented", 1.0))
            .unwrap();
        assert!(vented.len() > plain.len() + 10);
    }
}
