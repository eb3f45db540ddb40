//! Horizontal cable manager
//!
//! A recessed channel with evenly spaced routing fingers. Parameters:
//! `fingers` (default 12 per unit row).

use super::{at_least_one, palette, DeviceGeometry, DeviceRenderer, StyleOptions};
use crate::core::{Canvas, RackError, Rect};

pub struct CableManagerRenderer;

impl DeviceRenderer for CableManagerRenderer {
    fn name(&self) -> &'static str {
        "cable_manager"
    }

    fn draw(&self, canvas: &mut Canvas, frame: Rect, style: &StyleOptions) -> Result<(), RackError> {
        let geometry = DeviceGeometry::new(frame, style.rack_units)?;
        let fingers = style.count("fingers", 12, 2, 64)?;

        let body = geometry.body();
        geometry.draw_ears(canvas, palette::EAR);
        canvas.fill_rect(body, palette::CHASSIS);

        // recessed channel behind the fingers
        let lip = geometry.vertical_inches(0.15);
        let channel = Rect::new(
            body.x,
            body.y + lip,
            body.width,
            (body.height - 2.0 * lip).max(1.0),
        );
        canvas.fill_rect(channel, palette::HOLE);

        let finger_w = geometry.inches(0.3);
        let pitch = (body.width - finger_w) / f64::from(fingers - 1);
        let finger_h = at_least_one(channel.height * 0.8);
        let radius = finger_w / 2.0;
        for i in 0..fingers {
            let x = body.x + f64::from(i) * pitch;
            canvas.rect(
                Rect::new(x, channel.y, finger_w, finger_h),
                Some(palette::CHASSIS_LIGHT),
                None,
                radius,
            );
        }

        geometry.draw_outline(canvas);
        Ok(())
    }
}
