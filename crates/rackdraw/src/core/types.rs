//! Core type definitions for rack diagrams
//!
//! Rack geometry constants, colors, rectangles, image formats and the
//! source-kind tag carried by every rendered device.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Height of one rack unit in inches (EIA-310)
pub const RACK_UNIT_INCHES: f64 = 1.75;

/// Panel width of a standard 19-inch rack, including mounting ears
pub const RACK_WIDTH_INCHES: f64 = 19.0;

/// Default pixel height of one rack unit on the editor canvas
pub const RACK_UNIT_PIXELS: f64 = 44.0;

/// Default pixel width of a placed device
pub const STANDARD_WIDTH_PIXELS: f64 = 480.0;

/// An RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Create a color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, alpha dropped
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a 0.0..=1.0 opacity
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Scale RGB channels towards black by `factor` (0.0 = unchanged)
    pub fn darken(&self, factor: f64) -> Self {
        let keep = (1.0 - factor).clamp(0.0, 1.0);
        let scale = |c: u8| (f64::from(c) * keep).round() as u8;
        Self::rgba(scale(self.r), scale(self.g), scale(self.b), self.a)
    }

    /// Relative luminance, used to pick a readable label color
    pub fn luminance(&self) -> f64 {
        (0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b))
            / 255.0
    }

    /// Black or white, whichever reads better on top of this color
    pub fn contrasting_text(&self) -> Self {
        if self.luminance() > 0.55 {
            Color::rgb(0x11, 0x18, 0x27)
        } else {
            Color::WHITE
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Chassis color used for a category when no visual asset exists
pub fn category_color(category: &str) -> Color {
    match category {
        "switches" => Color::rgb(0x25, 0x63, 0xeb),
        "routers" => Color::rgb(0x7c, 0x3a, 0xed),
        "patch-panels" => Color::rgb(0x47, 0x55, 0x69),
        "racks" => Color::rgb(0x1f, 0x29, 0x37),
        "cable-managers" => Color::rgb(0x0f, 0x76, 0x6e),
        "blank-panels" => Color::rgb(0x6b, 0x72, 0x80),
        "ports" => Color::rgb(0xd9, 0x77, 0x06),
        "servers" => Color::rgb(0x05, 0x96, 0x69),
        "power" => Color::rgb(0xdc, 0x26, 0x26),
        _ => Color::rgb(0x9c, 0xa3, 0xaf),
    }
}

/// An axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Shrink on every side by `amount`, never below zero size
    pub fn inset(&self, amount: f64) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// True when both sides are finite and strictly positive
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Image asset formats, in no particular order
///
/// Use [`ImageFormat::PREFERENCE`] for the order the loader tries them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Svg,
    Png,
    Webp,
    Jpeg,
}

impl ImageFormat {
    /// Vector first, then raster formats by descending quality
    pub const PREFERENCE: [ImageFormat; 4] = [
        ImageFormat::Svg,
        ImageFormat::Png,
        ImageFormat::Webp,
        ImageFormat::Jpeg,
    ];

    /// Position in the preference order (lower is tried first)
    pub fn rank(&self) -> usize {
        Self::PREFERENCE
            .iter()
            .position(|f| f == self)
            .unwrap_or(Self::PREFERENCE.len())
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, ImageFormat::Svg)
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "png" => Ok(ImageFormat::Png),
            "webp" => Ok(ImageFormat::Webp),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            _ => Err(format!("Unknown image format: {}", s)),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Svg => write!(f, "svg"),
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Webp => write!(f, "webp"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Which stage of the fallback chain produced a device visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Image,
    Procedural,
    Placeholder,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Image => write!(f, "image"),
            SourceKind::Procedural => write!(f, "procedural"),
            SourceKind::Placeholder => write!(f, "placeholder"),
        }
    }
}
