//! Keystone patch panel
//!
//! Numbered keystone jacks in banks of six, 24 per row. A 2U panel with 48
//! ports gets two rows, one per rack unit. Parameters: `ports` (default 24).

use super::port::{draw_rj45, RJ45_ASPECT};
use super::{at_least_one, grouped_columns, palette, DeviceGeometry, DeviceRenderer, StyleOptions};
use crate::core::{fit_font_size, fit_label, Canvas, RackError, Rect, TextAnchor};

/// Keystone insert, 14.5mm × 16mm, drawn behind each jack
const KEYSTONE_ASPECT: f64 = 14.5 / 16.0;

const PORTS_PER_ROW: u32 = 24;
const BANK_COLUMNS: u32 = 6;

pub struct PatchPanelRenderer;

impl DeviceRenderer for PatchPanelRenderer {
    fn name(&self) -> &'static str {
        "patch_panel"
    }

    fn draw(&self, canvas: &mut Canvas, frame: Rect, style: &StyleOptions) -> Result<(), RackError> {
        let geometry = DeviceGeometry::new(frame, style.rack_units)?;
        let ports = style.count("ports", 24, 1, 96)?;

        let rows = ports
            .div_ceil(PORTS_PER_ROW)
            .max(geometry.rack_units.min(ports));
        let columns = ports.div_ceil(rows);

        let body = geometry.body();
        geometry.draw_ears(canvas, palette::EAR);
        canvas.fill_rect(body, palette::CHASSIS_LIGHT);

        let margin = geometry.inches(0.3);
        let label_w = if style.label.is_some() {
            geometry.inches(1.5)
        } else {
            0.0
        };
        let area = Rect::new(
            body.x + margin + label_w,
            body.y,
            (body.width - 2.0 * margin - label_w).max(1.0),
            body.height,
        );
        let row_h = area.height / f64::from(rows);

        let bank_gap = geometry.inches(0.3);
        let gap = geometry.inches(0.06);
        let banks = columns.div_ceil(BANK_COLUMNS);
        let fit_w = (area.width
            - f64::from(banks.saturating_sub(1)) * bank_gap
            - f64::from(columns.saturating_sub(1)) * gap)
            / f64::from(columns);
        let key_h = at_least_one((row_h * 0.55).min(fit_w / KEYSTONE_ASPECT));
        let key_w = at_least_one(key_h * KEYSTONE_ASPECT);
        let xs = grouped_columns(area, columns, key_w, gap, BANK_COLUMNS, bank_gap);
        let number_size = at_least_one(row_h * 0.16);

        for port in 0..ports {
            let row = port / columns;
            let column = (port % columns) as usize;
            let row_top = area.y + f64::from(row) * row_h;
            let key_y = row_top + row_h * 0.35;
            let key = Rect::new(xs[column], key_y, key_w, key_h);

            canvas.text(
                key.center_x(),
                row_top + row_h * 0.3,
                &(port + 1).to_string(),
                number_size,
                palette::LABEL,
                TextAnchor::Middle,
            );
            canvas.fill_rect(key, palette::KEYSTONE);
            let jack_h = at_least_one(key_h * 0.78);
            let jack_w = at_least_one((jack_h * RJ45_ASPECT).min(key_w * 0.9));
            draw_rj45(
                canvas,
                Rect::new(
                    key.center_x() - jack_w / 2.0,
                    key.center_y() - jack_h / 2.0,
                    jack_w,
                    jack_h,
                ),
                false,
            );
        }

        if let Some(label) = &style.label {
            let size = fit_font_size(label, label_w, geometry.units(0.18));
            canvas.text(
                body.x + margin,
                body.y + geometry.units(0.55),
                &fit_label(label, label_w, size),
                size,
                palette::LABEL,
                TextAnchor::Start,
            );
        }

        geometry.draw_outline(canvas);
        Ok(())
    }
}
