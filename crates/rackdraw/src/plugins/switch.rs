//! Access switch faceplate
//!
//! Layout, left to right between the ears: a label and status LED block,
//! the RJ45 banks in groups of six columns with alternating rows flipped,
//! then the SFP uplink cages. Parameters: `ports` (default 24), `uplinks`
//! (default 4), `poe` (flag, adds a PoE marker).

use tracing::trace;

use super::port::{draw_led, draw_rj45, RJ45_ASPECT};
use super::{at_least_one, grouped_columns, palette, DeviceGeometry, DeviceRenderer, StyleOptions};
use crate::core::{fit_font_size, fit_label, Canvas, RackError, Rect, Stroke, TextAnchor};

/// SFP cage opening, 13.7mm × 8.6mm
const SFP_ASPECT: f64 = 13.7 / 8.6;

/// Columns per port bank
const BANK_COLUMNS: u32 = 6;

pub struct SwitchRenderer;

impl DeviceRenderer for SwitchRenderer {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn draw(&self, canvas: &mut Canvas, frame: Rect, style: &StyleOptions) -> Result<(), RackError> {
        let geometry = DeviceGeometry::new(frame, style.rack_units)?;
        let ports = style.count("ports", 24, 1, 96)?;
        let uplinks = style.count("uplinks", 4, 0, 8)?;

        let body = geometry.body();
        geometry.draw_ears(canvas, palette::EAR);
        canvas.fill_rect(body, palette::CHASSIS);

        // Port rows span the first rack unit; taller chassis center it
        let unit_top = body.y + (body.height - geometry.unit) / 2.0;
        let margin = geometry.inches(0.2);

        // Label and LED block
        let info_w = geometry.inches(2.4);
        let info = Rect::new(body.x + margin, unit_top, info_w, geometry.unit);
        let led_r = geometry.units(0.045);
        for (i, color) in [palette::LED_GREEN, palette::LED_GREEN, palette::LED_AMBER]
            .into_iter()
            .enumerate()
        {
            draw_led(
                canvas,
                info.x + led_r + i as f64 * led_r * 3.5,
                info.y + geometry.units(0.22),
                led_r,
                color,
            );
        }
        if let Some(label) = &style.label {
            let size = fit_font_size(label, info.width, geometry.units(0.2));
            canvas.text(
                info.x,
                info.y + geometry.units(0.62),
                &fit_label(label, info.width, size),
                size,
                palette::LABEL,
                TextAnchor::Start,
            );
        }
        if style.flag("poe") {
            let size = geometry.units(0.14);
            canvas.text(
                info.x,
                info.y + geometry.units(0.86),
                "PoE+",
                size,
                palette::LED_AMBER,
                TextAnchor::Start,
            );
        }

        // Uplink cages, stacked in two rows from the right edge
        let sfp_h = geometry.units(0.28);
        let sfp_w = at_least_one(sfp_h * SFP_ASPECT);
        let sfp_cols = uplinks.div_ceil(2);
        let sfp_gap = geometry.inches(0.08);
        let uplink_w = f64::from(sfp_cols) * (sfp_w + sfp_gap);
        let uplink_area = Rect::new(
            body.right() - margin - uplink_w,
            unit_top,
            uplink_w,
            geometry.unit,
        );
        let sfp_xs = grouped_columns(uplink_area, sfp_cols, sfp_w, sfp_gap, sfp_cols, 0.0);
        let row_tops = [
            unit_top + geometry.units(0.16),
            unit_top + geometry.unit - geometry.units(0.16) - sfp_h,
        ];
        for i in 0..uplinks {
            let x = sfp_xs[(i / 2) as usize];
            let y = row_tops[(i % 2) as usize];
            canvas.rect(
                Rect::new(x, y, sfp_w, sfp_h),
                Some(palette::HOLE),
                Some(Stroke::new(palette::STEEL, at_least_one(sfp_h * 0.05))),
                0.0,
            );
        }

        // Copper banks fill what is left
        let port_area = Rect::new(
            info.right() + margin,
            unit_top,
            (uplink_area.x - margin - info.right() - margin).max(1.0),
            geometry.unit,
        );
        let rows = if ports > 12 { 2 } else { 1 };
        let columns = ports.div_ceil(rows);
        let bank_gap = geometry.inches(0.25);
        let port_gap = geometry.inches(0.03);
        let banks = columns.div_ceil(BANK_COLUMNS);
        let fit_w = (port_area.width
            - f64::from(banks.saturating_sub(1)) * bank_gap
            - f64::from(columns.saturating_sub(1)) * port_gap)
            / f64::from(columns);

        let row_h = geometry.units(if rows == 2 { 0.36 } else { 0.5 });
        let jack_h = at_least_one(row_h.min(fit_w / RJ45_ASPECT));
        let jack_w = at_least_one(jack_h * RJ45_ASPECT);
        let xs = grouped_columns(port_area, columns, jack_w, port_gap, BANK_COLUMNS, bank_gap);
        let stack_h = f64::from(rows) * jack_h + f64::from(rows - 1) * geometry.units(0.06);
        let first_row = port_area.center_y() - stack_h / 2.0;

        for port in 0..ports {
            let column = (port / rows) as usize;
            let row = port % rows;
            let y = first_row + f64::from(row) * (jack_h + geometry.units(0.06));
            // Odd port numbers on top with the latch up
            draw_rj45(canvas, Rect::new(xs[column], y, jack_w, jack_h), row == 0 && rows == 2);
        }

        geometry.draw_outline(canvas);
        trace!(ports, uplinks, rows, "Switch drawn");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Primitive;

    fn draw(style: &StyleOptions) -> Canvas {
        let mut canvas = Canvas::new(480.0, 44.0);
        let frame = canvas.frame();
        SwitchRenderer
            .draw(&mut canvas, frame, style)
            .unwrap();
        canvas
    }

    fn contact_count(canvas: &Canvas) -> usize {
        canvas
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { fill: Some(c), .. } if *c == palette::CONTACT))
            .count()
    }

    #[test]
    fn test_port_count_follows_params() {
        let small = draw(&StyleOptions::new(1).with_param("ports", 24.0));
        let large = draw(&StyleOptions::new(1).with_param("ports", 48.0));
        assert_eq!(contact_count(&small), 24 * 8);
        assert_eq!(contact_count(&large), 48 * 8);
    }

    #[test]
    fn test_everything_stays_inside_frame() {
        let canvas = draw(
            &StyleOptions::new(1)
                .with_param("ports", 48.0)
                .with_param("uplinks", 4.0)
                .with_label("C9200L"),
        );
        for primitive in canvas.primitives() {
            if matches!(primitive, Primitive::Text { .. }) {
                continue;
            }
            let b = primitive.bounds();
            assert!(b.x >= -0.01 && b.right() <= 480.01, "{:?}", primitive);
            assert!(b.y >= -0.01 && b.bottom() <= 44.01, "{:?}", primitive);
        }
    }

    #[test]
    fn test_invalid_port_count() {
        let mut canvas = Canvas::new(480.0, 44.0);
        let frame = canvas.frame();
        let style = StyleOptions::new(1).with_param("ports", 0.0);
        assert!(SwitchRenderer
            .draw(&mut canvas, frame, &style)
            .is_err());
    }

    #[test]
    fn test_poe_marker() {
        let canvas = draw(&StyleOptions::new(1).with_param("poe", 1.0));
        assert!(canvas
            .primitives()
            .iter()
            .any(|p| matches!(p, Primitive::Text { text, .. } if text == "PoE+")));
    }
}
