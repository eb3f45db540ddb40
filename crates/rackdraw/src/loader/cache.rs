//! Decoded image assets and the session cache that holds them

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::GenericImageView as _;
use resvg::tiny_skia::{Pixmap, Transform};

use crate::core::{ImageFormat, RackError};

/// Largest side of a rasterised asset
pub const MAX_RASTER_SIDE: u32 = 4096;

/// A successfully decoded device image
#[derive(Clone, PartialEq)]
pub struct ImageAsset {
    /// Resolved path the bytes were fetched from
    pub path: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    bytes: Vec<u8>,
}

impl ImageAsset {
    /// Decode `bytes` as `format`, keeping the original encoding
    ///
    /// SVG is parsed with `usvg`; raster formats with the `image` crate.
    pub fn decode(
        path: impl Into<String>,
        format: ImageFormat,
        bytes: Vec<u8>,
    ) -> Result<Self, RackError> {
        let path = path.into();
        let (width, height) = match format {
            ImageFormat::Svg => {
                let options = resvg::usvg::Options::default();
                let tree = resvg::usvg::Tree::from_data(&bytes, &options)
                    .map_err(|e| RackError::asset_error(&path, format!("invalid SVG: {}", e)))?;
                let size = tree.size();
                (size.width().ceil() as u32, size.height().ceil() as u32)
            }
            raster => {
                let image_format = match raster {
                    ImageFormat::Png => image::ImageFormat::Png,
                    ImageFormat::Webp => image::ImageFormat::WebP,
                    _ => image::ImageFormat::Jpeg,
                };
                let decoded = image::load_from_memory_with_format(&bytes, image_format)
                    .map_err(|e| RackError::asset_error(&path, format!("decode failed: {}", e)))?;
                decoded.dimensions()
            }
        };

        if width == 0 || height == 0 {
            return Err(RackError::asset_error(&path, "image has zero size"));
        }

        Ok(Self {
            path,
            format,
            width,
            height,
            bytes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:` URI embedding the original bytes
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Straight-alpha RGBA bitmap of the asset
    ///
    /// SVG is rendered through `resvg` at `scale` times its natural size.
    /// Raster formats are decoded at their own size and ignore `scale`.
    pub fn rasterize(&self, scale: f32) -> Result<image::RgbaImage, RackError> {
        if !self.format.is_vector() {
            let decoded = image::load_from_memory(&self.bytes)
                .map_err(|e| RackError::asset_error(&self.path, e.to_string()))?;
            return Ok(decoded.to_rgba8());
        }

        let mut options = resvg::usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        let tree = resvg::usvg::Tree::from_data(&self.bytes, &options)
            .map_err(|e| RackError::asset_error(&self.path, format!("invalid SVG: {}", e)))?;
        let size = tree.size();
        let width = (size.width() * scale).ceil();
        let height = (size.height() * scale).ceil();
        let limit = MAX_RASTER_SIDE as f32;
        if !(width >= 1.0 && height >= 1.0 && width <= limit && height <= limit) {
            return Err(RackError::asset_error(
                &self.path,
                format!("raster size {}x{} is outside 1..={}", width, height, MAX_RASTER_SIDE),
            ));
        }

        let (width, height) = (width as u32, height as u32);
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RackError::asset_error(&self.path, format!("failed to allocate {}x{} bitmap", width, height))
        })?;
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        // tiny-skia keeps premultiplied alpha
        let data = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let c = pixel.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        image::RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| RackError::asset_error(&self.path, "bitmap size mismatch"))
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Decoded assets keyed by resolved path, for one editing session
///
/// Entries are written once and never evicted. Writers race benignly: the
/// first decoded value for a key wins and later ones are dropped.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: RwLock<HashMap<String, Arc<ImageAsset>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a decoded asset, counting the hit or miss
    pub fn get(&self, key: &str) -> Option<Arc<ImageAsset>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(asset) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(asset))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store an asset unless the key is already present; returns the cached value
    pub fn insert(&self, key: impl Into<String>, asset: ImageAsset) -> Arc<ImageAsset> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(entries.entry(key.into()).or_insert_with(|| Arc::new(asset)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drop every entry, ending the session
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TINY_SVG: &str =
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="480" height="44"><rect width="480" height="44"/></svg>"#;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_svg() {
        let asset = ImageAsset::decode("a.svg", ImageFormat::Svg, TINY_SVG.as_bytes().to_vec())
            .unwrap();
        assert_eq!((asset.width, asset.height), (480, 44));
        assert!(asset.data_uri().starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_decode_png() {
        let asset = ImageAsset::decode("a.png", ImageFormat::Png, tiny_png()).unwrap();
        assert_eq!((asset.width, asset.height), (4, 2));

        // raster assets keep their own size
        let bitmap = asset.rasterize(3.0).unwrap();
        assert_eq!(bitmap.dimensions(), (4, 2));
        assert_eq!(bitmap.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_rasterize_svg_scales() {
        let asset = ImageAsset::decode("a.svg", ImageFormat::Svg, TINY_SVG.as_bytes().to_vec())
            .unwrap();
        let bitmap = asset.rasterize(2.0).unwrap();
        assert_eq!(bitmap.dimensions(), (960, 88));
        // default SVG fill is opaque black
        assert_eq!(bitmap.get_pixel(10, 10).0, [0, 0, 0, 255]);

        assert!(asset.rasterize(100.0).is_err());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(ImageAsset::decode("a.png", ImageFormat::Png, b"not a png".to_vec()).is_err());
        assert!(ImageAsset::decode("a.svg", ImageFormat::Svg, b"<nope".to_vec()).is_err());
    }

    #[test]
    fn test_format_mismatch_fails() {
        // PNG bytes declared as JPEG
        assert!(ImageAsset::decode("a.jpg", ImageFormat::Jpeg, tiny_png()).is_err());
    }

    #[test]
    fn test_cache_first_insert_wins() {
        let cache = AssetCache::new();
        let first = ImageAsset::decode("a.png", ImageFormat::Png, tiny_png()).unwrap();
        let second = ImageAsset::decode("b.png", ImageFormat::Png, tiny_png()).unwrap();

        cache.insert("key", first);
        let kept = cache.insert("key", second);
        assert_eq!(kept.path, "a.png");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_counts_hits_and_misses() {
        let cache = AssetCache::new();
        assert!(cache.get("key").is_none());
        cache.insert(
            "key",
            ImageAsset::decode("a.png", ImageFormat::Png, tiny_png()).unwrap(),
        );
        assert!(cache.get("key").is_some());
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
