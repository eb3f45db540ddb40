//! Raster export through `resvg`

use resvg::tiny_skia::{Pixmap, Transform};
use tracing::debug;

use super::svg::export_svg;
use crate::core::RackError;
use crate::scene::Scene;

/// Largest side accepted for the output bitmap
pub const MAX_PNG_SIDE: f64 = 16_384.0;

/// Rasterise the scene SVG at the view zoom
pub fn export_png(scene: &Scene) -> Result<Vec<u8>, RackError> {
    let zoom = scene.view.zoom;
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(RackError::export_error(format!(
            "zoom must be a positive number, got {}",
            zoom
        )));
    }

    let svg = export_svg(scene);
    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = resvg::usvg::Tree::from_str(&svg, &options)
        .map_err(|e| RackError::export_error(format!("failed to parse scene SVG: {}", e)))?;

    let size = tree.size();
    let width = (f64::from(size.width()) * zoom).ceil();
    let height = (f64::from(size.height()) * zoom).ceil();
    if width < 1.0 || height < 1.0 || width > MAX_PNG_SIDE || height > MAX_PNG_SIDE {
        return Err(RackError::export_error(format!(
            "output size {}x{} is outside 1..={} pixels",
            width, height, MAX_PNG_SIDE
        )));
    }

    let mut pixmap = Pixmap::new(width as u32, height as u32).ok_or_else(|| {
        RackError::export_error(format!("failed to allocate {}x{} bitmap", width, height))
    })?;
    resvg::render(
        &tree,
        Transform::from_scale(zoom as f32, zoom as f32),
        &mut pixmap.as_mut(),
    );
    debug!(width, height, "Scene rasterised");

    pixmap
        .encode_png()
        .map_err(|e| RackError::export_error(format!("failed to encode PNG: {}", e)))
}
