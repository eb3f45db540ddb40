//! Device loader
//!
//! Turns a `(category, key)` pair into a drawn surface. The fallback chain
//! runs in a fixed order and always ends with something visible:
//!
//! 1. catalog images, in [`crate::core::ImageFormat::PREFERENCE`] order
//! 2. the procedural renderer named by the descriptor
//! 3. a labelled placeholder box
//!
//! Every failed stage is logged and falls through to the next one, so
//! [`DeviceLoader::load_device`] never returns an error.

mod cache;
mod source;

pub use cache::{AssetCache, ImageAsset, MAX_RASTER_SIDE};
pub use source::{AssetSource, FsAssetSource, MemoryAssetSource};

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, span, warn, Level};

use crate::catalog::{CatalogIndex, DeviceDescriptor, ImageRef};
use crate::core::{
    fit_font_size, fit_label, Canvas, Color, RackError, Rect, SourceKind, Stroke, RACK_UNIT_PIXELS,
    STANDARD_WIDTH_PIXELS,
};
use crate::plugins::{RendererRegistry, StyleOptions};

const PLACEHOLDER_FILL: Color = Color::rgb(0xf3, 0xf4, 0xf6);
const PLACEHOLDER_OUTLINE: Color = Color::rgb(0x6b, 0x72, 0x80);
const PLACEHOLDER_TEXT: Color = Color::rgb(0x37, 0x41, 0x51);

/// Sizing and naming inputs for one load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Surface width in pixels
    pub width: f64,
    /// Pixel height of one rack unit
    pub unit_height: f64,
    /// Name for the placeholder when the catalog has none
    pub display_name: Option<String>,
    /// Height used when the catalog has no entry
    pub rack_units: Option<u32>,
    /// Renderer parameters layered over the catalog's
    pub params: BTreeMap<String, f64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            width: STANDARD_WIDTH_PIXELS,
            unit_height: RACK_UNIT_PIXELS,
            display_name: None,
            rack_units: None,
            params: BTreeMap::new(),
        }
    }
}

impl LoadOptions {
    pub fn new(width: f64, unit_height: f64) -> Self {
        Self {
            width,
            unit_height,
            ..Self::default()
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_rack_units(mut self, rack_units: u32) -> Self {
        self.rack_units = Some(rack_units.max(1));
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    fn surface_size(&self, rack_units: u32) -> (f64, f64) {
        (self.width, f64::from(rack_units.max(1)) * self.unit_height)
    }
}

/// Outcome of one device load
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub surface: Canvas,
    /// Decoded asset when the image stage succeeded
    pub asset: Option<Arc<ImageAsset>>,
    pub source_kind: SourceKind,
    pub rack_units: u32,
    pub display_name: String,
}

impl RenderResult {
    pub fn is_placeholder(&self) -> bool {
        self.source_kind == SourceKind::Placeholder
    }
}

/// Resolves devices through the catalog, asset source and renderers
///
/// Cheap to clone; every part is shared. One loader (and its cache) belongs
/// to one editing session.
#[derive(Clone)]
pub struct DeviceLoader {
    catalog: Arc<CatalogIndex>,
    source: Arc<dyn AssetSource>,
    cache: Arc<AssetCache>,
    renderers: Arc<RendererRegistry>,
}

impl DeviceLoader {
    /// Create a loader with a fresh cache and the built-in renderers
    pub fn new(catalog: Arc<CatalogIndex>, source: Arc<dyn AssetSource>) -> Self {
        Self::with_parts(
            catalog,
            source,
            Arc::new(AssetCache::new()),
            Arc::new(RendererRegistry::with_builtin()),
        )
    }

    pub fn with_parts(
        catalog: Arc<CatalogIndex>,
        source: Arc<dyn AssetSource>,
        cache: Arc<AssetCache>,
        renderers: Arc<RendererRegistry>,
    ) -> Self {
        Self {
            catalog,
            source,
            cache,
            renderers,
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogIndex> {
        &self.catalog
    }

    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }

    pub fn renderers(&self) -> &Arc<RendererRegistry> {
        &self.renderers
    }

    /// Load a device onto `surface`, falling back as far as needed
    pub fn load_device(
        &self,
        category: &str,
        key: &str,
        surface: Canvas,
        options: &LoadOptions,
    ) -> RenderResult {
        let load_span = span!(Level::INFO, "load_device", category, key);
        let _enter = load_span.enter();

        let mut surface = surface;
        let Some(descriptor) = self.catalog.get(category, key) else {
            warn!("Device not in catalog, drawing placeholder");
            let name = options
                .display_name
                .clone()
                .unwrap_or_else(|| key.to_string());
            let rack_units = options.rack_units.unwrap_or(1).max(1);
            return self.placeholder(surface, name, rack_units, options);
        };

        let (width, height) = options.surface_size(descriptor.rack_units);

        // Stage 1: images in preference order
        for image in &descriptor.images {
            match self.load_asset(image) {
                Ok(asset) => {
                    surface.reset(width, height);
                    surface.image(Rect::new(0.0, 0.0, width, height), Arc::clone(&asset));
                    info!(format = %image.format, path = %image.path, "Loaded device image");
                    return RenderResult {
                        surface,
                        asset: Some(asset),
                        source_kind: SourceKind::Image,
                        rack_units: descriptor.rack_units,
                        display_name: descriptor.display_name.clone(),
                    };
                }
                Err(e) => {
                    warn!(format = %image.format, error = %e, "Image unavailable, trying next source");
                }
            }
        }

        // Stage 2: procedural renderer
        if let Some(renderer) = &descriptor.procedural {
            surface.reset(width, height);
            let style = self.style_for(descriptor, options);
            match self
                .renderers
                .draw(renderer, &mut surface, surface_frame(width, height), &style)
            {
                Ok(()) => {
                    info!(renderer = %renderer, "Rendered device procedurally");
                    return RenderResult {
                        surface,
                        asset: None,
                        source_kind: SourceKind::Procedural,
                        rack_units: descriptor.rack_units,
                        display_name: descriptor.display_name.clone(),
                    };
                }
                Err(e) => warn!(renderer = %renderer, error = %e, "Procedural render failed"),
            }
        } else {
            debug!("No procedural renderer declared");
        }

        // Stage 3: placeholder
        self.placeholder(
            surface,
            descriptor.display_name.clone(),
            descriptor.rack_units,
            options,
        )
    }

    /// Fetch and decode one image, through the cache
    pub fn load_asset(&self, image: &ImageRef) -> Result<Arc<ImageAsset>, RackError> {
        let cache_key = self.source.resolve(&image.path);
        if let Some(asset) = self.cache.get(&cache_key) {
            debug!(path = %cache_key, "Asset cache hit");
            return Ok(asset);
        }

        let bytes = self.source.fetch(&image.path)?;
        let asset = ImageAsset::decode(cache_key.clone(), image.format, bytes)?;
        debug!(
            path = %cache_key,
            source = self.source.name(),
            width = asset.width,
            height = asset.height,
            "Asset decoded"
        );
        Ok(self.cache.insert(cache_key, asset))
    }

    /// Preload every catalog image into the cache, returning how many loaded
    pub fn warm_cache(&self) -> usize {
        let warm_span = span!(Level::INFO, "warm_cache");
        let _enter = warm_span.enter();

        let loaded = self
            .catalog
            .iter()
            .flat_map(|descriptor| descriptor.images.iter())
            .filter(|image| match self.load_asset(image) {
                Ok(_) => true,
                Err(e) => {
                    debug!(error = %e, "Skipping asset during warm-up");
                    false
                }
            })
            .count();
        info!(loaded, cached = self.cache.len(), "Asset cache warmed");
        loaded
    }

    fn style_for(&self, descriptor: &DeviceDescriptor, options: &LoadOptions) -> StyleOptions {
        let mut style = StyleOptions::new(descriptor.rack_units);
        style.label = Some(descriptor.display_name.clone());
        style.params = descriptor.params.clone();
        style
            .params
            .extend(options.params.iter().map(|(k, v)| (k.clone(), *v)));
        style
    }

    fn placeholder(
        &self,
        mut surface: Canvas,
        display_name: String,
        rack_units: u32,
        options: &LoadOptions,
    ) -> RenderResult {
        let (width, height) = options.surface_size(rack_units);
        surface.reset(width, height);
        draw_placeholder(&mut surface, &display_name);
        debug!(name = %display_name, rack_units, "Placeholder drawn");
        RenderResult {
            surface,
            asset: None,
            source_kind: SourceKind::Placeholder,
            rack_units,
            display_name,
        }
    }
}

impl std::fmt::Debug for DeviceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLoader")
            .field("devices", &self.catalog.len())
            .field("source", &self.source.name())
            .field("cached", &self.cache.len())
            .field("renderers", &self.renderers)
            .finish()
    }
}

fn surface_frame(width: f64, height: f64) -> Rect {
    Rect::new(0.0, 0.0, width, height)
}

/// Outlined box with the device name centered in it
///
/// Degenerate surfaces get nothing drawn; the caller decides what to do.
pub fn draw_placeholder(surface: &mut Canvas, label: &str) {
    let frame = surface.frame();
    if !frame.is_drawable() {
        return;
    }
    let stroke_w = (frame.height * 0.04).clamp(0.5, 2.0);
    surface.rect(
        frame.inset(stroke_w / 2.0),
        Some(PLACEHOLDER_FILL),
        Some(Stroke::new(PLACEHOLDER_OUTLINE, stroke_w)),
        0.0,
    );
    let max_width = frame.width * 0.9;
    let size = fit_font_size(label, max_width, (frame.height * 0.4).min(16.0));
    surface.text_centered(
        frame,
        &fit_label(label, max_width, size),
        size,
        PLACEHOLDER_TEXT,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ImageFormat, Primitive};

    const SVG: &str =
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="480" height="44"><rect width="480" height="44"/></svg>"#;

    fn catalog() -> Arc<CatalogIndex> {
        let mut index = CatalogIndex::new();
        index.insert(
            DeviceDescriptor::new("switches", "imaged", "Imaged Switch", 1)
                .with_image(ImageFormat::Png, "imaged.png")
                .with_image(ImageFormat::Svg, "imaged.svg")
                .with_procedural("switch"),
        );
        index.insert(
            DeviceDescriptor::new("patch-panels", "pp", "Patch Panel", 2)
                .with_image(ImageFormat::Png, "missing.png")
                .with_procedural("patch_panel")
                .with_param("ports", 48.0),
        );
        index.insert(DeviceDescriptor::new("routers", "bare", "Bare Router", 1));
        index.insert(
            DeviceDescriptor::new("routers", "unknown", "Odd Router", 3)
                .with_procedural("toaster"),
        );
        Arc::new(index)
    }

    fn loader() -> DeviceLoader {
        let source = MemoryAssetSource::new().with_asset("imaged.svg", SVG);
        DeviceLoader::new(catalog(), Arc::new(source))
    }

    #[test]
    fn test_image_stage_prefers_svg() {
        let result = loader().load_device(
            "switches",
            "imaged",
            Canvas::default(),
            &LoadOptions::default(),
        );
        assert_eq!(result.source_kind, SourceKind::Image);
        let asset = result.asset.as_ref().unwrap();
        assert_eq!(asset.format, ImageFormat::Svg);
        assert!(matches!(result.surface.primitives(), [Primitive::Image { .. }]));
        assert_eq!((result.surface.width, result.surface.height), (480.0, 44.0));
    }

    #[test]
    fn test_procedural_stage_resizes_surface() {
        let result = loader().load_device(
            "patch-panels",
            "pp",
            Canvas::new(10.0, 10.0),
            &LoadOptions::default(),
        );
        assert_eq!(result.source_kind, SourceKind::Procedural);
        assert_eq!(result.rack_units, 2);
        assert_eq!((result.surface.width, result.surface.height), (480.0, 88.0));
        assert!(result.asset.is_none());
    }

    #[test]
    fn test_placeholder_for_bare_and_unknown_renderer() {
        let loader = loader();
        for key in ["bare", "unknown"] {
            let result =
                loader.load_device("routers", key, Canvas::default(), &LoadOptions::default());
            assert_eq!(result.source_kind, SourceKind::Placeholder);
        }
        let unknown =
            loader.load_device("routers", "unknown", Canvas::default(), &LoadOptions::default());
        assert_eq!(unknown.rack_units, 3);
        assert_eq!(unknown.display_name, "Odd Router");
        assert_eq!(unknown.surface.height, 3.0 * 44.0);
    }

    #[test]
    fn test_catalog_miss_names() {
        let loader = loader();
        let by_key =
            loader.load_device("switches", "nope", Canvas::default(), &LoadOptions::default());
        assert_eq!(by_key.display_name, "nope");
        assert_eq!(by_key.rack_units, 1);

        let options = LoadOptions::default()
            .with_display_name("Spare Switch")
            .with_rack_units(2);
        let named = loader.load_device("switches", "nope", Canvas::default(), &options);
        assert_eq!(named.display_name, "Spare Switch");
        assert_eq!(named.rack_units, 2);
        assert!(named.surface.primitives().iter().any(
            |p| matches!(p, Primitive::Text { text, .. } if text == "Spare Switch")
        ));
    }

    #[test]
    fn test_placeholder_on_degenerate_surface_draws_nothing() {
        let loader = loader();
        let result = loader.load_device(
            "routers",
            "bare",
            Canvas::default(),
            &LoadOptions::new(0.0, 44.0),
        );
        assert!(result.is_placeholder());
        assert!(result.surface.is_empty());
    }

    #[test]
    fn test_option_params_override_catalog() {
        let loader = loader();
        let options = LoadOptions::default().with_param("ports", 24.0);
        let style = loader.style_for(loader.catalog().get("patch-panels", "pp").unwrap(), &options);
        assert_eq!(style.param("ports", 0.0), 24.0);
        assert_eq!(style.label.as_deref(), Some("Patch Panel"));
    }

    #[test]
    fn test_warm_cache() {
        let loader = loader();
        assert_eq!(loader.warm_cache(), 1);
        assert_eq!(loader.cache().len(), 1);
    }
}
