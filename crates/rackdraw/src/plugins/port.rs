//! RJ45 jack
//!
//! A single 8P8C jack seen head-on: a dark opening with the latch notch at
//! the bottom and eight gold contacts along the top. The switch and patch
//! panel renderers place many of these through [`draw_rj45`].

use super::{at_least_one, palette, DeviceRenderer, StyleOptions};
use crate::core::{Canvas, Color, RackError, Rect, Stroke};

/// Opening width over height for an RJ45 jack (11.7mm × 13.5mm housing)
pub const RJ45_ASPECT: f64 = 11.7 / 13.5;

const CONTACTS: u32 = 8;

/// Draw one jack filling `rect`
pub fn draw_rj45(canvas: &mut Canvas, rect: Rect, flipped: bool) {
    let w = at_least_one(rect.width);
    let h = at_least_one(rect.height);
    let rect = Rect::new(rect.x, rect.y, w, h);

    canvas.rect(
        rect,
        Some(palette::JACK),
        Some(Stroke::new(palette::STEEL, at_least_one(w * 0.04).min(w / 4.0))),
        w * 0.06,
    );

    // latch notch on the side opposite the contacts
    let notch_w = at_least_one(w * 0.42);
    let notch_h = at_least_one(h * 0.2);
    let notch_y = if flipped { rect.y } else { rect.bottom() - notch_h };
    canvas.fill_rect(
        Rect::new(rect.center_x() - notch_w / 2.0, notch_y, notch_w, notch_h),
        palette::HOLE,
    );

    let pitch = w * 0.8 / f64::from(CONTACTS);
    let contact_w = at_least_one(pitch * 0.5);
    let contact_h = at_least_one(h * 0.22);
    let left = rect.x + w * 0.1 + (pitch - contact_w) / 2.0;
    let contact_y = if flipped {
        rect.bottom() - h * 0.12 - contact_h
    } else {
        rect.y + h * 0.12
    };
    for i in 0..CONTACTS {
        canvas.fill_rect(
            Rect::new(left + f64::from(i) * pitch, contact_y, contact_w, contact_h),
            palette::CONTACT,
        );
    }
}

/// Draw a status LED as a small circle
pub fn draw_led(canvas: &mut Canvas, cx: f64, cy: f64, r: f64, color: Color) {
    canvas.circle(cx, cy, at_least_one(r), Some(color), None);
}

/// Standalone jack, used for keystone ports placed on their own
pub struct PortRenderer;

impl DeviceRenderer for PortRenderer {
    fn name(&self) -> &'static str {
        "port"
    }

    fn draw(&self, canvas: &mut Canvas, frame: Rect, style: &StyleOptions) -> Result<(), RackError> {
        if !frame.is_drawable() {
            return Err(RackError::render_error("port frame is empty"));
        }

        // keystone body, then the largest jack that keeps its aspect
        canvas.rect(frame, Some(palette::KEYSTONE), None, frame.height * 0.08);
        let jack_h = at_least_one(frame.height * 0.75);
        let jack_w = at_least_one((jack_h * RJ45_ASPECT).min(frame.width * 0.9));
        let jack = Rect::new(
            frame.center_x() - jack_w / 2.0,
            frame.center_y() - jack_h / 2.0,
            jack_w,
            jack_h,
        );
        draw_rj45(canvas, jack, style.flag("flipped"));
        Ok(())
    }
}
