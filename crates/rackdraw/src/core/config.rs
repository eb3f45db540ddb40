//! Editor configuration
//!
//! Loaded from a JSON file, then adjusted from the environment and finally
//! from command-line flags. Every field has a default, so an empty `{}` file
//! is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::RackError;
use super::types::{RACK_UNIT_PIXELS, STANDARD_WIDTH_PIXELS};

/// Session-wide settings for the loader, composer and exporters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Pixel height of one rack unit
    pub rack_unit_pixels: f64,
    /// Pixel width given to every placed device
    pub standard_width: f64,
    /// Base directory image paths in the catalog are relative to
    pub asset_dir: PathBuf,
    /// Catalog document; the bundled catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Initial view zoom, also the PNG export scale
    pub zoom: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            rack_unit_pixels: RACK_UNIT_PIXELS,
            standard_width: STANDARD_WIDTH_PIXELS,
            asset_dir: PathBuf::from("assets"),
            catalog_path: None,
            zoom: 1.0,
            canvas_width: 1200.0,
            canvas_height: 2000.0,
        }
    }
}

impl EditorConfig {
    /// Load and validate a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self, RackError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RackError::config_error(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let config: EditorConfig = serde_json::from_str(&content).map_err(|e| {
            RackError::config_error(format!("failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded editor config");
        Ok(config)
    }

    /// Apply `RACKDRAW_ASSET_DIR` and `RACKDRAW_CATALOG` when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("RACKDRAW_ASSET_DIR") {
            self.asset_dir = PathBuf::from(dir);
        }
        if let Ok(catalog) = std::env::var("RACKDRAW_CATALOG") {
            self.catalog_path = Some(PathBuf::from(catalog));
        }
        self
    }

    /// Reject sizes that would produce degenerate surfaces
    pub fn validate(&self) -> Result<(), RackError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(RackError::config_error(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )))
            }
        };
        positive("rackUnitPixels", self.rack_unit_pixels)?;
        positive("standardWidth", self.standard_width)?;
        positive("zoom", self.zoom)?;
        positive("canvasWidth", self.canvas_width)?;
        positive("canvasHeight", self.canvas_height)?;
        Ok(())
    }

    /// Pixel height of a device spanning `rack_units`
    pub fn device_height(&self, rack_units: u32) -> f64 {
        f64::from(rack_units.max(1)) * self.rack_unit_pixels
    }
}
