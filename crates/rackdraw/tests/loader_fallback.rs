//! Fallback chain and asset cache, driven through the public API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rackdraw::catalog::{CatalogIndex, BUNDLED_CATALOG};
use rackdraw::prelude::*;
use tempfile::tempdir;

const CISCO_SVG: &[u8] = include_bytes!("../assets/switches/cisco-c9200l-24t-4g.svg");

/// Memory source that counts fetches
#[derive(Default)]
struct CountingSource {
    inner: MemoryAssetSource,
    fetches: AtomicUsize,
}

impl AssetSource for CountingSource {
    fn resolve(&self, path: &str) -> String {
        self.inner.resolve(path)
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>, RackError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(path)
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

fn bundled_catalog() -> Arc<CatalogIndex> {
    Arc::new(CatalogIndex::from_json_str(BUNDLED_CATALOG).unwrap())
}

#[test]
fn test_image_asset_fetched_once() {
    let source = Arc::new(CountingSource {
        inner: MemoryAssetSource::bundled(),
        fetches: AtomicUsize::new(0),
    });
    let loader = DeviceLoader::new(bundled_catalog(), source.clone());

    for _ in 0..3 {
        let result = loader.load_device(
            "switches",
            "cisco-c9200l-24t-4g",
            Canvas::default(),
            &LoadOptions::default(),
        );
        assert_eq!(result.source_kind, SourceKind::Image);
    }
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(loader.cache().len(), 1);
    assert_eq!(loader.cache().hits(), 2);
}

#[test]
fn test_clones_share_cache() {
    let loader = DeviceLoader::new(bundled_catalog(), Arc::new(MemoryAssetSource::bundled()));
    let other = loader.clone();

    loader.load_device(
        "switches",
        "cisco-c9200l-24t-4g",
        Canvas::default(),
        &LoadOptions::default(),
    );
    assert_eq!(other.cache().len(), 1);
}

#[test]
fn test_removed_asset_falls_back_to_placeholder() {
    let dir = tempdir().unwrap();
    let switches = dir.path().join("switches");
    std::fs::create_dir_all(&switches).unwrap();
    let asset = switches.join("cisco-c9200l-24t-4g.svg");
    std::fs::write(&asset, CISCO_SVG).unwrap();

    let loader = DeviceLoader::new(bundled_catalog(), Arc::new(FsAssetSource::new(dir.path())));
    let result = loader.load_device(
        "switches",
        "cisco-c9200l-24t-4g",
        Canvas::default(),
        &LoadOptions::default(),
    );
    assert_eq!(result.source_kind, SourceKind::Image);
    assert_eq!(result.display_name, "Cisco Catalyst C9200L-24T-4G");

    std::fs::remove_file(&asset).unwrap();
    let fresh = DeviceLoader::new(bundled_catalog(), Arc::new(FsAssetSource::new(dir.path())));
    let result = fresh.load_device(
        "switches",
        "cisco-c9200l-24t-4g",
        Canvas::default(),
        &LoadOptions::default(),
    );
    // no procedural renderer declared for this device
    assert!(result.is_placeholder());
    assert!(result.asset.is_none());
    assert_eq!(result.display_name, "Cisco Catalyst C9200L-24T-4G");
    assert_eq!(result.rack_units, 1);
    assert!(!result.surface.is_empty());
}

#[test]
fn test_corrupt_image_tries_next_format() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("switches")).unwrap();
    std::fs::write(dir.path().join("switches/cisco-c9200l-48p-4g.png"), b"not a png").unwrap();

    let loader = DeviceLoader::new(bundled_catalog(), Arc::new(FsAssetSource::new(dir.path())));
    let result = loader.load_device(
        "switches",
        "cisco-c9200l-48p-4g",
        Canvas::default(),
        &LoadOptions::default(),
    );
    assert_eq!(result.source_kind, SourceKind::Procedural);
    assert!(loader.cache().is_empty());
}

#[test]
fn test_asset_paths_cannot_escape_base_dir() {
    let dir = tempdir().unwrap();
    let source = FsAssetSource::new(dir.path().join("assets"));
    assert!(source.fetch("../secret.png").is_err());
    assert!(source.fetch("/etc/passwd").is_err());
}

#[test]
fn test_catalog_miss_loader_vs_composer() {
    let loader = DeviceLoader::new(bundled_catalog(), Arc::new(MemoryAssetSource::new()));
    let result = loader.load_device(
        "switches",
        "imaginary-9000",
        Canvas::default(),
        &LoadOptions::default().with_display_name("Imaginary 9000"),
    );
    assert!(result.is_placeholder());
    assert_eq!(result.display_name, "Imaginary 9000");

    let composer = EquipmentComposer::new(loader, EditorConfig::default());
    assert!(composer
        .create_scene_object("switches", "imaginary-9000", 0.0, 0.0)
        .is_none());
}

#[test]
fn test_composer_placeholder_gets_chassis() {
    let loader = DeviceLoader::new(bundled_catalog(), Arc::new(MemoryAssetSource::new()));
    let composer = EquipmentComposer::new(loader, EditorConfig::default());

    let object = composer
        .create_scene_object("routers", "cisco-isr-4331", 12.0, 34.0)
        .unwrap();
    assert_eq!(object.source_kind, SourceKind::Placeholder);
    assert_eq!(object.equipment_name, "Cisco ISR 4331");
    assert_eq!((object.x, object.y), (12.0, 34.0));
    assert_eq!(object.locks, LockFlags::EQUIPMENT);
    assert_eq!((object.surface.width, object.surface.height), (480.0, 44.0));
    assert!(!object.surface.is_empty());
}

#[test]
fn test_config_sizes_flow_into_objects() {
    let config = EditorConfig {
        rack_unit_pixels: 20.0,
        standard_width: 300.0,
        ..EditorConfig::default()
    };
    let loader = DeviceLoader::new(bundled_catalog(), Arc::new(MemoryAssetSource::bundled()));
    let composer = EquipmentComposer::new(loader, config);

    let panel = composer
        .create_scene_object("patch-panels", "cat6-48-port", 0.0, 0.0)
        .unwrap();
    assert_eq!(panel.source_kind, SourceKind::Procedural);
    assert_eq!((panel.surface.width, panel.surface.height), (300.0, 40.0));
    assert_eq!(panel.rack_units, 2);
}

#[test]
fn test_rack_units_match_catalog_at_every_stage() {
    let catalog = bundled_catalog();
    let with_assets = DeviceLoader::new(catalog.clone(), Arc::new(MemoryAssetSource::bundled()));
    let without_assets = DeviceLoader::new(catalog.clone(), Arc::new(MemoryAssetSource::new()));

    for descriptor in catalog.iter() {
        for loader in [&with_assets, &without_assets] {
            let result = loader.load_device(
                &descriptor.category,
                &descriptor.key,
                Canvas::default(),
                &LoadOptions::default(),
            );
            assert_eq!(result.rack_units, descriptor.rack_units, "{}", descriptor.key);
            assert_eq!(result.surface.height, 44.0 * f64::from(descriptor.rack_units));
        }
    }
}
