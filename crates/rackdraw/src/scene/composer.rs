//! Equipment composer: catalog entries in, placeable scene objects out

use tracing::{debug, info, span, Level};

use super::{LockFlags, SceneObject};
use crate::core::{
    category_color, fit_font_size, fit_label, Canvas, EditorConfig, SourceKind, Stroke,
    RACK_UNIT_PIXELS, STANDARD_WIDTH_PIXELS,
};
use crate::loader::{DeviceLoader, LoadOptions, RenderResult};

/// Wraps loader output into scene objects with equipment constraints
#[derive(Debug, Clone)]
pub struct EquipmentComposer {
    loader: DeviceLoader,
    config: EditorConfig,
}

impl EquipmentComposer {
    pub fn new(loader: DeviceLoader, config: EditorConfig) -> Self {
        Self { loader, config }
    }

    pub fn loader(&self) -> &DeviceLoader {
        &self.loader
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Create a placeable object for a catalog device at `(x, y)`
    ///
    /// Returns `None` when the catalog has no such device. Every other
    /// outcome is a visible object: devices the loader could only draw as
    /// a placeholder get a chassis in their category color instead.
    pub fn create_scene_object(
        &self,
        category: &str,
        key: &str,
        x: f64,
        y: f64,
    ) -> Option<SceneObject> {
        let compose_span = span!(Level::INFO, "create_scene_object", category, key);
        let _enter = compose_span.enter();

        let descriptor = self.loader.catalog().get(category, key)?;
        let options = LoadOptions::new(self.config.standard_width, self.config.rack_unit_pixels);
        let height = self.config.device_height(descriptor.rack_units);
        let result = self.loader.load_device(
            category,
            key,
            Canvas::new(self.config.standard_width, height),
            &options,
        );

        let RenderResult {
            mut surface,
            source_kind,
            display_name,
            ..
        } = result;

        if source_kind == SourceKind::Placeholder || !surface.frame().is_drawable() {
            debug!(%source_kind, "Using category chassis");
            draw_chassis(&mut surface, category, &display_name, descriptor.rack_units);
        }

        info!(%source_kind, rack_units = descriptor.rack_units, "Scene object created");
        Some(SceneObject {
            id: 0,
            category: category.to_string(),
            key: key.to_string(),
            equipment_name: display_name,
            rack_units: descriptor.rack_units,
            x,
            y,
            scale: 1.0,
            locks: LockFlags::EQUIPMENT,
            rack_position: None,
            source_kind,
            surface,
        })
    }
}

/// Category-colored box with the device name centered on it
fn draw_chassis(surface: &mut Canvas, category: &str, name: &str, rack_units: u32) {
    let (mut width, mut height) = (surface.width, surface.height);
    if !surface.frame().is_drawable() {
        width = STANDARD_WIDTH_PIXELS;
        height = f64::from(rack_units.max(1)) * RACK_UNIT_PIXELS;
    }
    surface.reset(width, height);

    let fill = category_color(category);
    let frame = surface.frame();
    surface.rect(
        frame,
        Some(fill),
        Some(Stroke::new(fill.darken(0.3), 1.0)),
        2.0,
    );
    let max_width = frame.width * 0.9;
    let size = fit_font_size(name, max_width, (frame.height * 0.4).min(14.0));
    surface.text_centered(
        frame,
        &fit_label(name, max_width, size),
        size,
        fill.contrasting_text(),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{CatalogIndex, DeviceDescriptor};
    use crate::core::{ImageFormat, Primitive};
    use crate::loader::MemoryAssetSource;

    fn composer(config: EditorConfig) -> EquipmentComposer {
        let mut catalog = CatalogIndex::new();
        catalog.insert(
            DeviceDescriptor::new("routers", "isr", "Cisco ISR 4331", 2)
                .with_image(ImageFormat::Png, "isr.png"),
        );
        catalog.insert(
            DeviceDescriptor::new("patch-panels", "pp", "Patch Panel", 1)
                .with_procedural("patch_panel"),
        );
        let loader = DeviceLoader::new(Arc::new(catalog), Arc::new(MemoryAssetSource::new()));
        EquipmentComposer::new(loader, config)
    }

    #[test]
    fn test_catalog_miss_is_none() {
        let composer = composer(EditorConfig::default());
        assert!(composer
            .create_scene_object("routers", "missing", 0.0, 0.0)
            .is_none());
        assert!(composer
            .create_scene_object("Routers", "isr", 0.0, 0.0)
            .is_none());
    }

    #[test]
    fn test_placeholder_becomes_category_chassis() {
        let composer = composer(EditorConfig::default());
        let object = composer
            .create_scene_object("routers", "isr", 5.0, 6.0)
            .unwrap();
        assert_eq!(object.source_kind, SourceKind::Placeholder);
        assert_eq!(object.rack_units, 2);
        assert_eq!((object.x, object.y), (5.0, 6.0));
        assert_eq!(object.locks, LockFlags::EQUIPMENT);
        assert!(matches!(
            object.surface.primitives().first(),
            Some(Primitive::Rect { fill: Some(c), .. }) if *c == category_color("routers")
        ));
        assert!(object.surface.primitives().iter().any(
            |p| matches!(p, Primitive::Text { text, .. } if text == "Cisco ISR 4331")
        ));
    }

    #[test]
    fn test_procedural_object_uses_config_size() {
        let config = EditorConfig {
            standard_width: 240.0,
            rack_unit_pixels: 22.0,
            ..EditorConfig::default()
        };
        let object = composer(config)
            .create_scene_object("patch-panels", "pp", 0.0, 0.0)
            .unwrap();
        assert_eq!(object.source_kind, SourceKind::Procedural);
        assert_eq!((object.surface.width, object.surface.height), (240.0, 22.0));
    }

    #[test]
    fn test_degenerate_surface_gets_chassis() {
        let mut surface = Canvas::new(0.0, 0.0);
        draw_chassis(&mut surface, "switches", "Switch", 2);
        assert_eq!((surface.width, surface.height), (480.0, 88.0));
        assert!(!surface.is_empty());
    }
}
