//! Device descriptors: the static metadata for one device type

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::ImageFormat;

/// One image asset of a device, path relative to the asset base directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub format: ImageFormat,
    pub path: String,
}

/// Static metadata describing one device type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDescriptor {
    pub category: String,
    pub key: String,
    pub display_name: String,
    /// Height in rack units, at least 1
    pub rack_units: u32,
    /// Image assets in loader preference order
    pub images: Vec<ImageRef>,
    /// Name of a registered procedural renderer
    pub procedural: Option<String>,
    /// Numeric style parameters for the procedural renderer
    pub params: BTreeMap<String, f64>,
    pub description: Option<String>,
}

impl DeviceDescriptor {
    /// Create a descriptor with no assets
    pub fn new(
        category: impl Into<String>,
        key: impl Into<String>,
        display_name: impl Into<String>,
        rack_units: u32,
    ) -> Self {
        Self {
            category: category.into(),
            key: key.into(),
            display_name: display_name.into(),
            rack_units: rack_units.max(1),
            images: Vec::new(),
            procedural: None,
            params: BTreeMap::new(),
            description: None,
        }
    }

    /// Add an image asset, keeping preference order
    pub fn with_image(mut self, format: ImageFormat, path: impl Into<String>) -> Self {
        self.images.retain(|image| image.format != format);
        self.images.push(ImageRef {
            format,
            path: path.into(),
        });
        self.images.sort_by_key(|image| image.format.rank());
        self
    }

    /// Declare a procedural fallback renderer
    pub fn with_procedural(mut self, renderer: impl Into<String>) -> Self {
        self.procedural = Some(renderer.into());
        self
    }

    /// Set one renderer parameter
    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn has_visual_source(&self) -> bool {
        !self.images.is_empty() || self.procedural.is_some()
    }
}

/// Descriptor fields as they appear in the catalog document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDescriptor {
    pub name: String,
    pub rack_units: i64,
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    #[serde(default)]
    pub procedural: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    #[serde(default)]
    pub description: Option<String>,
}
