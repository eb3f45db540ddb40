//! Device catalog
//!
//! A read-only index from category and device key to [`DeviceDescriptor`].
//! The catalog is loaded once per session from a JSON document:
//!
//! ```json
//! {
//!   "switches": {
//!     "cisco-c9200l-24t-4g": {
//!       "name": "Cisco Catalyst C9200L-24T-4G",
//!       "rackUnits": 1,
//!       "images": { "svg": "switches/cisco-c9200l-24t-4g.svg" }
//!     }
//!   }
//! }
//! ```
//!
//! Lookups are exact and case-sensitive. A missing entry is a normal outcome
//! and is reported as `None`.

mod descriptor;

pub use descriptor::{DeviceDescriptor, ImageRef};

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, span, warn, Level};

use crate::core::{ImageFormat, RackError};
use descriptor::RawDescriptor;

/// Catalog shipped with the crate
pub const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Tallest device the catalog accepts, in rack units
pub const MAX_RACK_UNITS: u32 = 60;

/// Category → key → descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIndex {
    categories: BTreeMap<String, BTreeMap<String, DeviceDescriptor>>,
}

impl CatalogIndex {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog bundled with the crate
    pub fn bundled() -> Result<Self, RackError> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    /// Parse a catalog document
    ///
    /// Malformed JSON is an error. Individual entries outside
    /// `1..=MAX_RACK_UNITS` rack units are skipped, as are image entries in
    /// unknown formats.
    pub fn from_json_str(json: &str) -> Result<Self, RackError> {
        let load_span = span!(Level::DEBUG, "catalog_parse", input_len = json.len());
        let _enter = load_span.enter();

        let raw: BTreeMap<String, BTreeMap<String, RawDescriptor>> = serde_json::from_str(json)
            .map_err(|e| RackError::catalog_error(format!("invalid catalog document: {}", e)))?;

        let mut index = CatalogIndex::new();
        for (category, devices) in raw {
            for (key, entry) in devices {
                if entry.rack_units < 1 || entry.rack_units > i64::from(MAX_RACK_UNITS) {
                    warn!(
                        category = %category,
                        key = %key,
                        rack_units = entry.rack_units,
                        "Skipping catalog entry with invalid rack unit count"
                    );
                    continue;
                }

                let mut descriptor = DeviceDescriptor::new(
                    category.clone(),
                    key.clone(),
                    entry.name,
                    entry.rack_units as u32,
                );
                for (format, path) in entry.images {
                    match format.parse::<ImageFormat>() {
                        Ok(format) => descriptor = descriptor.with_image(format, path),
                        Err(e) => warn!(category = %category, key = %key, "{}", e),
                    }
                }
                descriptor.procedural = entry.procedural;
                descriptor.params = entry.params;
                descriptor.description = entry.description;
                if !descriptor.has_visual_source() {
                    debug!(
                        category = %category,
                        key = %key,
                        "Catalog entry has no image or renderer, it will load as a placeholder"
                    );
                }
                index.insert(descriptor);
            }
        }

        debug!(devices = index.len(), "Catalog parsed");
        Ok(index)
    }

    /// Load a catalog document from disk
    pub fn load_from_file(path: &Path) -> Result<Self, RackError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RackError::catalog_error(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let index = Self::from_json_str(&content)?;
        info!(path = %path.display(), devices = index.len(), "Catalog loaded");
        Ok(index)
    }

    /// Load a catalog, degrading to an empty one when it cannot be read
    ///
    /// Every lookup against the empty catalog misses, so devices fall back to
    /// placeholders instead of the session failing.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "Catalog unavailable, continuing with an empty catalog");
                Self::new()
            }
        }
    }

    /// Add or replace a descriptor
    pub fn insert(&mut self, descriptor: DeviceDescriptor) {
        self.categories
            .entry(descriptor.category.clone())
            .or_default()
            .insert(descriptor.key.clone(), descriptor);
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, category: &str, key: &str) -> Option<&DeviceDescriptor> {
        self.categories.get(category)?.get(key)
    }

    pub fn contains(&self, category: &str, key: &str) -> bool {
        self.get(category, key).is_some()
    }

    /// Category names in sorted order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Devices of one category, sorted by key
    pub fn devices(&self, category: &str) -> impl Iterator<Item = &DeviceDescriptor> {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|devices| devices.values())
    }

    /// Every descriptor, sorted by category then key
    pub fn iter(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.categories.values().flat_map(|devices| devices.values())
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
