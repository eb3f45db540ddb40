//! Procedural device renderers
//!
//! Each plugin draws one device family onto a [`Canvas`] from numbers alone.
//! They all follow the same geometry pattern: a base unit (one rack unit in
//! surface space) and a pixels-per-inch factor are derived from the frame,
//! and every other length is a datasheet proportion of one of those two. A
//! device therefore scales uniformly with whatever frame it is given.
//!
//! Renderers never look at the catalog, the scene or the filesystem. Drawing
//! the same frame with the same options twice yields equal canvases.

pub mod blank_panel;
pub mod cable_manager;
pub mod patch_panel;
pub mod port;
pub mod rack;
pub mod registry;
pub mod switch;

pub use blank_panel::BlankPanelRenderer;
pub use cable_manager::CableManagerRenderer;
pub use patch_panel::PatchPanelRenderer;
pub use port::PortRenderer;
pub use rack::RackRenderer;
pub use registry::RendererRegistry;
pub use switch::SwitchRenderer;

use std::collections::BTreeMap;

use crate::catalog::MAX_RACK_UNITS;
use crate::core::{Canvas, Color, RackError, Rect, Stroke, RACK_UNIT_INCHES, RACK_WIDTH_INCHES};

/// Core trait for procedural device renderers
pub trait DeviceRenderer: Send + Sync {
    /// Registry name, as referenced from the catalog
    fn name(&self) -> &'static str;

    /// Draw the device into `frame`
    fn draw(&self, canvas: &mut Canvas, frame: Rect, style: &StyleOptions) -> Result<(), RackError>;
}

/// Per-device inputs to a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    /// Rack units the frame spans
    pub rack_units: u32,
    /// Text printed on the faceplate, if the renderer has room for one
    pub label: Option<String>,
    /// Numeric parameters from the catalog (`ports`, `uplinks` ...)
    pub params: BTreeMap<String, f64>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

impl StyleOptions {
    pub fn new(rack_units: u32) -> Self {
        Self {
            rack_units: rack_units.max(1),
            label: None,
            params: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Numeric parameter or `default`
    pub fn param(&self, name: &str, default: f64) -> f64 {
        self.params
            .get(name)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    /// Boolean flag parameter (any non-zero value is true)
    pub fn flag(&self, name: &str) -> bool {
        self.param(name, 0.0) != 0.0
    }

    /// Integer count parameter, rejected when outside `min..=max`
    pub fn count(&self, name: &str, default: u32, min: u32, max: u32) -> Result<u32, RackError> {
        let value = self.param(name, f64::from(default)).round();
        if value < f64::from(min) || value > f64::from(max) {
            return Err(RackError::render_error(format!(
                "{} must be between {} and {}, got {}",
                name, min, max, value
            )));
        }
        Ok(value as u32)
    }
}

/// Clamp a derived length to at least one surface unit
pub fn at_least_one(value: f64) -> f64 {
    if value.is_finite() {
        value.max(1.0)
    } else {
        1.0
    }
}

/// Faceplate colors shared by the built-in renderers
pub mod palette {
    use crate::core::Color;

    pub const CHASSIS: Color = Color::rgb(0x1f, 0x29, 0x33);
    pub const CHASSIS_LIGHT: Color = Color::rgb(0x3e, 0x4c, 0x59);
    pub const EAR: Color = Color::rgb(0x32, 0x3f, 0x4b);
    pub const HOLE: Color = Color::rgb(0x0b, 0x0f, 0x14);
    pub const STEEL: Color = Color::rgb(0x9a, 0xa5, 0xb1);
    pub const JACK: Color = Color::rgb(0x0b, 0x0f, 0x14);
    pub const CONTACT: Color = Color::rgb(0xd4, 0xa0, 0x17);
    pub const KEYSTONE: Color = Color::rgb(0xe4, 0xe7, 0xeb);
    pub const LED_GREEN: Color = Color::rgb(0x3e, 0xbd, 0x93);
    pub const LED_AMBER: Color = Color::rgb(0xf7, 0xc9, 0x48);
    pub const LABEL: Color = Color::rgb(0xcb, 0xd2, 0xd9);
    pub const OUTLINE: Color = Color::rgb(0x11, 0x18, 0x27);
}

/// Rack-mount ear width per side (19" panel, 17.5" between ears)
pub const EAR_WIDTH_INCHES: f64 = 0.75;

/// Mounting holes sit this far from the top and bottom of each unit
pub const EAR_HOLE_OFFSET_INCHES: f64 = 0.25;

/// Geometry shared by every renderer for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceGeometry {
    pub frame: Rect,
    pub rack_units: u32,
    /// One rack unit in surface space
    pub unit: f64,
    /// Surface units per inch of panel width
    pub px_per_inch: f64,
}

impl DeviceGeometry {
    /// Derive geometry, rejecting frames that cannot be drawn
    pub fn new(frame: Rect, rack_units: u32) -> Result<Self, RackError> {
        if !frame.is_drawable() {
            return Err(RackError::render_error(format!(
                "cannot draw into a {}x{} frame",
                frame.width, frame.height
            )));
        }
        if rack_units > MAX_RACK_UNITS {
            return Err(RackError::render_error(format!(
                "{} rack units exceeds the {}U limit",
                rack_units, MAX_RACK_UNITS
            )));
        }
        let rack_units = rack_units.max(1);
        Ok(Self {
            frame,
            rack_units,
            unit: frame.height / f64::from(rack_units),
            px_per_inch: frame.width / RACK_WIDTH_INCHES,
        })
    }

    /// A panel dimension in inches, converted and clamped
    pub fn inches(&self, inches: f64) -> f64 {
        at_least_one(inches * self.px_per_inch)
    }

    /// A vertical proportion of one rack unit, clamped
    pub fn units(&self, fraction: f64) -> f64 {
        at_least_one(fraction * self.unit)
    }

    /// Vertical inches, measured against the rack unit height
    pub fn vertical_inches(&self, inches: f64) -> f64 {
        self.units(inches / RACK_UNIT_INCHES)
    }

    pub fn ear_width(&self) -> f64 {
        self.inches(EAR_WIDTH_INCHES).min(self.frame.width / 4.0)
    }

    /// Faceplate area between the ears
    pub fn body(&self) -> Rect {
        let ear = self.ear_width();
        Rect::new(
            self.frame.x + ear,
            self.frame.y,
            (self.frame.width - 2.0 * ear).max(1.0),
            self.frame.height,
        )
    }

    /// Both mounting ears with two slotted holes per rack unit
    pub fn draw_ears(&self, canvas: &mut Canvas, color: Color) {
        let ear = self.ear_width();
        let hole_w = (ear * 0.4).max(1.0);
        let hole_h = self.vertical_inches(0.3);
        let offset = self.vertical_inches(EAR_HOLE_OFFSET_INCHES);

        for left in [self.frame.x, self.frame.right() - ear] {
            canvas.fill_rect(Rect::new(left, self.frame.y, ear, self.frame.height), color);
            let hole_x = left + (ear - hole_w) / 2.0;
            for u in 0..self.rack_units {
                let top = self.frame.y + f64::from(u) * self.unit;
                for y in [top + offset, top + self.unit - offset - hole_h] {
                    canvas.rect(
                        Rect::new(hole_x, y, hole_w, hole_h),
                        Some(palette::HOLE),
                        None,
                        hole_w / 2.0,
                    );
                }
            }
        }
    }

    /// Chassis outline around the full frame
    pub fn draw_outline(&self, canvas: &mut Canvas) {
        canvas.stroke_rect(
            self.frame,
            Stroke::new(palette::OUTLINE, (self.unit * 0.02).max(0.5)),
        );
    }
}

/// Column positions for `count` items of `width`, grouped with extra gaps
///
/// Items are laid out left to right in groups of `group` with `gap` between
/// items and `group_gap` between groups, then centered in `area`.
pub(crate) fn grouped_columns(
    area: Rect,
    count: u32,
    width: f64,
    gap: f64,
    group: u32,
    group_gap: f64,
) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let group = group.max(1);
    let groups = count.div_ceil(group);
    let total = f64::from(count) * width
        + f64::from(count - groups) * gap
        + f64::from(groups - 1) * group_gap;
    let mut x = area.x + (area.width - total) / 2.0;
    let mut columns = Vec::with_capacity(count as usize);
    for i in 0..count {
        if i > 0 {
            x += if i % group == 0 { group_gap } else { gap };
        }
        columns.push(x);
        x += width;
    }
    columns
}
