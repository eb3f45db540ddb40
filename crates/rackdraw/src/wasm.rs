//! WebAssembly bindings for Rackdraw
//!
//! Browser-facing wrappers over the bundled catalog and assets. Every
//! function that can fail returns a `Result` so failures surface as
//! JavaScript exceptions instead of panics.

use wasm_bindgen::prelude::*;

use crate::export::{export_svg, import_snapshot, Snapshot};
use crate::scene::Scene;

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// List the bundled catalog as JSON
///
/// Returns an array of `{category, key, name, rackUnits}` objects.
#[wasm_bindgen]
pub fn catalog_json() -> Result<String, JsValue> {
    let catalog = crate::catalog::CatalogIndex::bundled().map_err(to_js)?;
    let entries: Vec<_> = catalog
        .iter()
        .map(|device| {
            serde_json::json!({
                "category": device.category,
                "key": device.key,
                "name": device.display_name,
                "rackUnits": device.rack_units,
            })
        })
        .collect();
    serde_json::to_string(&entries).map_err(to_js)
}

/// Render one device to an SVG document
///
/// Unknown devices come back as a labelled placeholder.
#[wasm_bindgen]
pub fn render_device(category: &str, key: &str) -> Result<String, JsValue> {
    crate::render_device_svg(category, key).map_err(to_js)
}

/// Rebuild a scene from a snapshot and render it as SVG
#[wasm_bindgen]
pub fn snapshot_to_svg(snapshot_json: &str) -> Result<String, JsValue> {
    let composer = crate::bundled_composer().map_err(to_js)?;
    let mut scene = Scene::default();
    import_snapshot(snapshot_json, &composer, &mut scene).map_err(to_js)?;
    Ok(export_svg(&scene))
}

/// Validate a snapshot and return it re-serialised at the current version
#[wasm_bindgen]
pub fn normalize_snapshot(snapshot_json: &str) -> Result<String, JsValue> {
    let composer = crate::bundled_composer().map_err(to_js)?;
    let mut scene = Scene::default();
    import_snapshot(snapshot_json, &composer, &mut scene).map_err(to_js)?;
    Snapshot::capture(&scene).to_json().map_err(to_js)
}
