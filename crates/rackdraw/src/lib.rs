//! Rackdraw - Compose network-rack diagrams from device assets
//!
//! A library for placing catalog devices (switches, patch panels, racks,
//! cable managers, blank panels, ports) onto a rack diagram and exporting it
//! as SVG, PNG, PDF or a re-importable JSON snapshot. Each device is drawn
//! from an image asset when one loads, procedurally from datasheet
//! proportions otherwise, and as a labelled placeholder as a last resort.
//!
//! # Quick Start
//!
//! ```rust
//! use rackdraw::render_device_svg;
//!
//! let svg = render_device_svg("patch-panels", "cat6-24-port").unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```
//!
//! # Building a Scene
//!
//! ```rust
//! use rackdraw::prelude::*;
//!
//! let composer = rackdraw::bundled_composer().unwrap();
//! let mut scene = Scene::default();
//!
//! let panel = composer
//!     .create_scene_object("patch-panels", "cat6-24-port", 40.0, 400.0)
//!     .unwrap();
//! let id = scene.add(panel);
//! scene.set_rack_position(id, Some(1));
//!
//! // Unknown devices are not placeable
//! assert!(composer.create_scene_object("switches", "nope", 0.0, 0.0).is_none());
//!
//! let json = Snapshot::capture(&scene).to_json().unwrap();
//! assert!(json.contains("cat6-24-port"));
//! ```

pub mod catalog;
pub mod core;
pub mod export;
pub mod loader;
pub mod plugins;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use crate::core::*;

use std::sync::Arc;

use tracing::debug;

use crate::catalog::CatalogIndex;
use crate::loader::{AssetSource, DeviceLoader, FsAssetSource, LoadOptions, MemoryAssetSource};
use crate::scene::EquipmentComposer;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{CatalogIndex, DeviceDescriptor, ImageRef};
    pub use crate::core::{
        Canvas, Color, EditorConfig, ImageFormat, Primitive, RackError, Rect, SourceKind,
    };
    pub use crate::export::{
        export_filename, export_pdf, export_png, export_scene, export_svg, import_snapshot,
        ExportFormat, Snapshot,
    };
    pub use crate::loader::{
        AssetCache, AssetSource, DeviceLoader, FsAssetSource, LoadOptions, MemoryAssetSource,
        RenderResult,
    };
    pub use crate::plugins::{DeviceRenderer, RendererRegistry, StyleOptions};
    pub use crate::scene::{EquipmentComposer, LockFlags, Scene, SceneObject, ViewMetadata};
}

/// Catalog named by the configuration, or the bundled one
///
/// A configured catalog that cannot be read leaves the session with an
/// empty catalog: every lookup misses and devices load as placeholders.
pub fn load_catalog(config: &EditorConfig) -> anyhow::Result<CatalogIndex> {
    match &config.catalog_path {
        Some(path) => Ok(CatalogIndex::load_or_empty(path)),
        None => Ok(CatalogIndex::bundled()?),
    }
}

/// Asset source for the configured directory
///
/// Falls back to the assets bundled with the crate when the directory does
/// not exist.
pub fn asset_source(config: &EditorConfig) -> Arc<dyn AssetSource> {
    if config.asset_dir.is_dir() {
        Arc::new(FsAssetSource::new(&config.asset_dir))
    } else {
        debug!(
            dir = %config.asset_dir.display(),
            "Asset directory missing, using bundled assets"
        );
        Arc::new(MemoryAssetSource::bundled())
    }
}

/// Build a composer (and its loader) for one editing session
pub fn open_composer(config: &EditorConfig) -> anyhow::Result<EquipmentComposer> {
    config.validate()?;
    let catalog = Arc::new(load_catalog(config)?);
    let loader = DeviceLoader::new(catalog, asset_source(config));
    Ok(EquipmentComposer::new(loader, config.clone()))
}

/// Composer over the bundled catalog and assets
pub fn bundled_composer() -> anyhow::Result<EquipmentComposer> {
    let catalog = Arc::new(CatalogIndex::bundled()?);
    let loader = DeviceLoader::new(catalog, Arc::new(MemoryAssetSource::bundled()));
    Ok(EquipmentComposer::new(loader, EditorConfig::default()))
}

/// Render one bundled device as a standalone SVG document
///
/// Unknown devices render as a placeholder rather than failing.
///
/// # Example
/// ```rust
/// use rackdraw::render_device_svg;
///
/// let svg = render_device_svg("switches", "cisco-c9200l-24t-4g").unwrap();
/// assert!(svg.contains("data:image/svg+xml;base64,"));
/// ```
pub fn render_device_svg(category: &str, key: &str) -> anyhow::Result<String> {
    let composer = bundled_composer()?;
    let result = composer.loader().load_device(
        category,
        key,
        Canvas::default(),
        &LoadOptions::default(),
    );
    Ok(crate::core::svg::canvas_to_svg(&result.surface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{import_snapshot, Snapshot};
    use crate::scene::Scene;

    #[test]
    fn test_render_bundled_image_device() {
        let svg = render_device_svg("switches", "cisco-c9200l-24t-4g").unwrap();
        assert!(svg.contains("<image"));
    }

    #[test]
    fn test_render_procedural_device() {
        let svg = render_device_svg("racks", "42u-open-frame").unwrap();
        assert!(svg.contains("height=\"1848\""));
        assert!(!svg.contains("<image"));
    }

    #[test]
    fn test_render_unknown_device_is_placeholder() {
        let svg = render_device_svg("switches", "does-not-exist").unwrap();
        assert!(svg.contains("does-not-exist"));
    }

    #[test]
    fn test_missing_catalog_file_leaves_catalog_empty() {
        let config = EditorConfig {
            catalog_path: Some("/nonexistent/catalog.json".into()),
            ..EditorConfig::default()
        };
        let composer = open_composer(&config).unwrap();
        assert!(composer.loader().catalog().is_empty());
        assert!(composer
            .create_scene_object("switches", "cisco-c9200l-24t-4g", 0.0, 0.0)
            .is_none());

        let result = composer.loader().load_device(
            "switches",
            "cisco-c9200l-24t-4g",
            Canvas::default(),
            &LoadOptions::default(),
        );
        assert!(result.is_placeholder());
    }

    #[test]
    fn test_missing_asset_dir_uses_bundled() {
        let config = EditorConfig {
            asset_dir: "/nonexistent/assets".into(),
            ..EditorConfig::default()
        };
        let composer = open_composer(&config).unwrap();
        let object = composer
            .create_scene_object("switches", "cisco-c9200l-24t-4g", 0.0, 0.0)
            .unwrap();
        assert_eq!(object.source_kind, SourceKind::Image);
    }

    #[test]
    fn test_bundled_round_trip() {
        let composer = bundled_composer().unwrap();
        let mut scene = Scene::default();
        for (category, key, y) in [
            ("racks", "42u-open-frame", 0.0),
            ("patch-panels", "cat6-24-port", 100.0),
            ("routers", "cisco-isr-4331", 200.0),
        ] {
            let object = composer.create_scene_object(category, key, 10.0, y).unwrap();
            scene.add(object);
        }

        let json = Snapshot::capture(&scene).to_json().unwrap();
        let mut restored = Scene::default();
        import_snapshot(&json, &composer, &mut restored).unwrap();
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.equipment_list(), scene.equipment_list());
    }
}
