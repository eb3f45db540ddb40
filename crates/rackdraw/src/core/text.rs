//! Shared text utilities for device labels
//!
//! Surfaces do not measure fonts. Widths are estimated from display columns
//! with a fixed glyph aspect, which is close enough for Helvetica-like faces
//! to keep labels inside their faceplates.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Average glyph advance as a fraction of the font size
pub const GLYPH_ASPECT: f64 = 0.56;

/// Estimated rendered width of `text` at `size`
pub fn text_width(text: &str, size: f64) -> f64 {
    UnicodeWidthStr::width(text) as f64 * size * GLYPH_ASPECT
}

/// Truncate `label` with an ellipsis so it fits in `max_width` at `size`
///
/// # Example
/// ```
/// use rackdraw::core::fit_label;
///
/// assert_eq!(fit_label("Patch Panel", 1000.0, 10.0), "Patch Panel");
/// assert!(fit_label("Cisco Catalyst C9200L-24T-4G", 60.0, 10.0).ends_with('…'));
/// ```
pub fn fit_label(label: &str, max_width: f64, size: f64) -> String {
    if text_width(label, size) <= max_width {
        return label.to_string();
    }

    let column = size * GLYPH_ASPECT;
    if column <= 0.0 {
        return String::new();
    }
    // One column is reserved for the ellipsis
    let budget = (max_width / column).floor() as usize;
    if budget <= 1 {
        return String::new();
    }

    let mut fitted = String::new();
    let mut used = 0;
    for c in label.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget - 1 {
            break;
        }
        fitted.push(c);
        used += w;
    }
    let mut fitted = fitted.trim_end().to_string();
    fitted.push('…');
    fitted
}

/// Largest font size (capped at `max_size`) that fits `label` in `max_width`
pub fn fit_font_size(label: &str, max_width: f64, max_size: f64) -> f64 {
    let columns = UnicodeWidthStr::width(label) as f64;
    if columns == 0.0 {
        return max_size;
    }
    (max_width / (columns * GLYPH_ASPECT)).min(max_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_scales_with_size() {
        assert_eq!(text_width("", 12.0), 0.0);
        assert!(text_width("abc", 20.0) > text_width("abc", 10.0));
    }

    #[test]
    fn test_fit_label_short() {
        assert_eq!(fit_label("1U", 100.0, 12.0), "1U");
    }

    #[test]
    fn test_fit_label_truncates() {
        let fitted = fit_label("Horizontal Cable Manager", 50.0, 10.0);
        assert!(fitted.ends_with('…'));
        assert!(text_width(&fitted, 10.0) <= 50.0 + 10.0 * GLYPH_ASPECT);
    }

    #[test]
    fn test_fit_label_no_room() {
        assert_eq!(fit_label("Switch", 1.0, 12.0), "");
    }

    #[test]
    fn test_fit_font_size() {
        assert_eq!(fit_font_size("", 10.0, 14.0), 14.0);
        assert_eq!(fit_font_size("ab", 1000.0, 14.0), 14.0);
        assert!(fit_font_size("a long device label", 50.0, 14.0) < 14.0);
    }
}
